//! Smooth weighted round-robin
//!
//! Each entry carries a static weight and a running weight. A tick adds every
//! static weight to its running weight; the entry with the highest running
//! weight leads, earliest entry on ties. Leaders that are taken or rejected
//! pay back the total weight, which spreads picks proportionally.

/// One participant of the rotation
#[derive(Debug, Clone)]
struct Entry<T> {
    item: T,
    weight: f64,
    current: f64,
}

/// Smooth weighted round-robin over arbitrary items
#[derive(Debug, Clone)]
pub struct WeightedRoundRobin<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for WeightedRoundRobin<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WeightedRoundRobin<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an item; negative or NaN weights count as zero
    pub fn push(&mut self, item: T, weight: f64) {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        self.entries.push(Entry {
            item,
            weight,
            current: 0.0,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    /// Items in queue order with their index
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries.iter().enumerate().map(|(i, e)| (i, &e.item))
    }

    /// Sum of static weights
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Advance every running weight by its static weight
    pub fn tick(&mut self) {
        for entry in &mut self.entries {
            entry.current += entry.weight;
        }
    }

    /// Index of the highest running weight among items passing `filter`
    pub fn leader(&self, filter: impl Fn(&T) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if !filter(&entry.item) {
                continue;
            }
            match best {
                Some((_, current)) if entry.current <= current => {}
                _ => best = Some((i, entry.current)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Charge an entry the total weight
    pub fn penalize(&mut self, index: usize) {
        let total = self.total_weight();
        if let Some(entry) = self.entries.get_mut(index) {
            entry.current -= total;
        }
    }

    /// Remove an entry, keeping the order of the rest
    pub fn remove(&mut self, index: usize) -> T {
        self.entries.remove(index).item
    }

    /// One full round: tick, take the leader, charge it
    pub fn select(&mut self) -> Option<&T> {
        self.tick();
        let index = self.leader(|_| true)?;
        self.penalize(index);
        self.get(index)
    }
}
