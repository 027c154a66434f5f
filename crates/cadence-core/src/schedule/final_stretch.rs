//! Final stretch topic selection
//!
//! When a plan has more pending topics than weekday slots before the exam,
//! final stretch mode keeps only the highest-ranked topics and records why
//! the rest were left out.

use crate::plan::{TopicExclusion, TopicRecord};

/// Topics kept for planning and topics cut
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalStretchSelection {
    /// Kept topics, in their original order
    pub selected: Vec<TopicRecord>,
    pub excluded: Vec<TopicExclusion>,
}

/// Keep the `available_slots` best pending topics.
///
/// Topics are ranked by `subject_weight * 10 + topic_weight`, ties broken by
/// the lower topic id. Everything fits when there are no more topics than
/// slots.
pub fn select_for_final_stretch(
    pending: &[TopicRecord],
    available_slots: usize,
) -> FinalStretchSelection {
    if pending.len() <= available_slots {
        return FinalStretchSelection {
            selected: pending.to_vec(),
            excluded: Vec::new(),
        };
    }

    let mut ranked: Vec<usize> = (0..pending.len()).collect();
    ranked.sort_by(|&a, &b| {
        pending[b]
            .final_stretch_priority()
            .cmp(&pending[a].final_stretch_priority())
            .then(pending[a].topic_id.cmp(&pending[b].topic_id))
    });

    let mut keep = vec![false; pending.len()];
    for &index in ranked.iter().take(available_slots) {
        keep[index] = true;
    }
    let cutoff = ranked
        .get(available_slots.saturating_sub(1))
        .filter(|_| available_slots > 0)
        .map(|&i| pending[i].final_stretch_priority());

    let mut selection = FinalStretchSelection::default();
    for (index, topic) in pending.iter().enumerate() {
        if keep[index] {
            selection.selected.push(topic.clone());
            continue;
        }
        let priority = topic.final_stretch_priority();
        let reason = match cutoff {
            Some(cutoff) => format!(
                "final stretch: {} pending topics for {} slots; priority {} below cut-off {}",
                pending.len(),
                available_slots,
                priority,
                cutoff
            ),
            None => format!(
                "final stretch: no slots available for {} pending topics",
                pending.len()
            ),
        };
        selection.excluded.push(TopicExclusion {
            topic_id: topic.topic_id,
            subject_id: topic.subject_id,
            subject_name: topic.subject_name.clone(),
            topic_name: topic.topic_name.clone(),
            priority,
            reason,
        });
    }

    tracing::info!(
        kept = selection.selected.len(),
        excluded = selection.excluded.len(),
        "Final stretch selection applied"
    );
    selection
}
