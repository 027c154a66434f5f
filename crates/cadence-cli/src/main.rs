//! Cadence CLI
//!
//! Command-line interface for seeding study plans, generating schedules and
//! inspecting the resulting sessions.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, bail};
use cadence_core::storage::DATABASE_FILE;
use cadence_core::{
    GenerationSummary, PlanInput, ScheduleGenerator, ScheduleParams, SessionStatus, SessionType,
    Storage, TopicStatus,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

/// Cadence - Study Schedule Engine CLI
#[derive(Parser)]
#[command(name = "cadence")]
#[command(author = "Cadence Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the Cadence study schedule engine")]
#[command(long_about = "Cadence turns a study plan's subjects, topics and weekly hours into a dated schedule.\n\nIt plans weighted recurrences, spaces repeats, consolidates reviews and fills spare days with mock exams.")]
struct Cli {
    /// Directory holding the database (defaults to the platform data directory)
    #[arg(long, global = true, env = "CADENCE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Acting user id
    #[arg(long, global = true, default_value_t = 1)]
    user: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and list study plans
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },

    /// Manage subjects of a plan
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },

    /// Manage topics of a subject
    Topic {
        #[command(subcommand)]
        action: TopicCommand,
    },

    /// Regenerate the pending schedule of a plan
    Generate {
        /// Plan id
        plan_id: i64,
        /// Weekly hours as weekday:hours pairs, Sunday = 0 (e.g. "1:2,2:2,6:3")
        #[arg(long)]
        hours: String,
        /// Session length in minutes
        #[arg(long, default_value_t = 50)]
        duration: i64,
        /// Add essay practice on Sundays
        #[arg(long)]
        essay: bool,
        /// Keep only the highest-priority topics when they outnumber weekday slots
        #[arg(long)]
        final_stretch: bool,
        /// Daily question goal
        #[arg(long)]
        daily_goal: Option<i64>,
        /// Weekly question goal
        #[arg(long)]
        weekly_goal: Option<i64>,
        /// Seed for mock-exam topic sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Plan as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the sessions of a plan
    Sessions {
        /// Plan id
        plan_id: i64,
        /// Only sessions with this status (pending, in_progress, completed)
        #[arg(long)]
        status: Option<String>,
    },

    /// Update a single session
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Show topics left out by final stretch mode
    Exclusions {
        /// Plan id
        plan_id: i64,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Create a plan
    Create {
        /// Plan name
        name: String,
        /// Exam date (YYYY-MM-DD)
        exam_date: NaiveDate,
    },
    /// List your plans
    List,
}

#[derive(Subcommand)]
enum SubjectCommand {
    /// Add a subject
    Add {
        plan_id: i64,
        name: String,
        /// Priority weight 1-5
        #[arg(long, default_value_t = 3)]
        weight: u8,
    },
    /// List subjects of a plan
    List { plan_id: i64 },
}

#[derive(Subcommand)]
enum TopicCommand {
    /// Add a topic
    Add {
        subject_id: i64,
        name: String,
        /// Priority weight 1-5
        #[arg(long, default_value_t = 3)]
        weight: u8,
    },
    /// List topics of a plan in scheduling order
    List { plan_id: i64 },
    /// Mark a topic completed
    Complete { topic_id: i64 },
    /// Mark a topic pending again
    Reopen { topic_id: i64 },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Mark a session in progress
    Start { session_id: i64 },
    /// Mark a session completed
    Complete { session_id: i64 },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let storage = open_storage(cli.data_dir)?;
    let user = cli.user;

    match cli.command {
        Commands::Plan { action } => run_plan(&storage, user, action),
        Commands::Subject { action } => run_subject(&storage, action),
        Commands::Topic { action } => run_topic(&storage, action),
        Commands::Generate {
            plan_id,
            hours,
            duration,
            essay,
            final_stretch,
            daily_goal,
            weekly_goal,
            seed,
            today,
            json,
        } => {
            let request = build_request(
                plan_id,
                user,
                &hours,
                duration,
                essay,
                final_stretch,
                daily_goal,
                weekly_goal,
            )?;
            run_generate(&storage, &request, seed, today, json)
        }
        Commands::Sessions { plan_id, status } => run_sessions(&storage, plan_id, status),
        Commands::Session { action } => run_session(&storage, action),
        Commands::Exclusions { plan_id } => run_exclusions(&storage, plan_id),
    }
}

/// Logs go to stderr; stdout carries command output
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

fn open_storage(data_dir: Option<PathBuf>) -> anyhow::Result<Storage> {
    let path = match data_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating data directory {}", dir.display()))?;
            Some(dir.join(DATABASE_FILE))
        }
        None => None,
    };
    Ok(Storage::new(path)?)
}

/// Parse "weekday:hours" pairs into the request's hours object
fn parse_hours(input: &str) -> anyhow::Result<Map<String, Value>> {
    let mut hours = Map::new();
    for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((day, value)) = pair.split_once(':') else {
            bail!("expected weekday:hours, got '{}'", pair);
        };
        let day: u8 = day
            .trim()
            .parse()
            .with_context(|| format!("invalid weekday '{}'", day.trim()))?;
        if day > 6 {
            bail!("weekday must be 0-6 (Sunday = 0), got {}", day);
        }
        hours.insert(day.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(hours)
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    plan_id: i64,
    user_id: i64,
    hours: &str,
    duration: i64,
    essay: bool,
    final_stretch: bool,
    daily_goal: Option<i64>,
    weekly_goal: Option<i64>,
) -> anyhow::Result<Value> {
    Ok(json!({
        "plan_id": plan_id,
        "user_id": user_id,
        "weekly_hours": parse_hours(hours)?,
        "session_duration_minutes": duration,
        "daily_question_goal": daily_goal,
        "weekly_question_goal": weekly_goal,
        "include_essay": essay,
        "final_stretch": final_stretch,
    }))
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_plan(storage: &Storage, user: i64, action: PlanCommand) -> anyhow::Result<()> {
    match action {
        PlanCommand::Create { name, exam_date } => {
            let plan = storage.create_plan(PlanInput::new(user, name, exam_date))?;
            println!(
                "{} plan {} ({}, exam {})",
                "Created".green().bold(),
                plan.id,
                plan.plan_name,
                plan.exam_date
            );
        }
        PlanCommand::List => {
            let plans = storage.list_plans(user)?;
            if plans.is_empty() {
                println!("{}", "No plans found.".dimmed());
            }
            for plan in plans {
                println!(
                    "{:>4}  {}  exam {}  {} h/week  {} min sessions",
                    plan.id,
                    plan.plan_name.white().bold(),
                    plan.exam_date,
                    plan.weekly_hours.total(),
                    plan.session_duration_minutes
                );
            }
        }
    }
    Ok(())
}

fn run_subject(storage: &Storage, action: SubjectCommand) -> anyhow::Result<()> {
    match action {
        SubjectCommand::Add { plan_id, name, weight } => {
            let subject = storage.add_subject(plan_id, &name, weight)?;
            println!(
                "{} subject {} ({}, weight {})",
                "Added".green().bold(),
                subject.id,
                subject.subject_name,
                subject.priority_weight
            );
        }
        SubjectCommand::List { plan_id } => {
            for subject in storage.list_subjects(plan_id)? {
                println!(
                    "{:>4}  {}  weight {}",
                    subject.id,
                    subject.subject_name.white().bold(),
                    subject.priority_weight
                );
            }
        }
    }
    Ok(())
}

fn run_topic(storage: &Storage, action: TopicCommand) -> anyhow::Result<()> {
    match action {
        TopicCommand::Add { subject_id, name, weight } => {
            let topic = storage.add_topic(subject_id, &name, weight)?;
            println!(
                "{} topic {} ({}, weight {})",
                "Added".green().bold(),
                topic.topic_id,
                topic.label(),
                topic.topic_weight
            );
        }
        TopicCommand::List { plan_id } => {
            for topic in storage.get_topics_for_plan(plan_id)? {
                let status = match topic.status {
                    TopicStatus::Pending => topic.status.as_str().yellow(),
                    TopicStatus::Completed => topic.status.as_str().green(),
                };
                println!(
                    "{:>4}  {}  weights {}/{}  {}",
                    topic.topic_id,
                    topic.label(),
                    topic.subject_weight,
                    topic.topic_weight,
                    status
                );
            }
        }
        TopicCommand::Complete { topic_id } => {
            storage.set_topic_status(topic_id, TopicStatus::Completed)?;
            println!("{} topic {}", "Completed".green().bold(), topic_id);
        }
        TopicCommand::Reopen { topic_id } => {
            storage.set_topic_status(topic_id, TopicStatus::Pending)?;
            println!("{} topic {}", "Reopened".yellow().bold(), topic_id);
        }
    }
    Ok(())
}

fn run_generate(
    storage: &Storage,
    request: &Value,
    seed: Option<u64>,
    today: Option<NaiveDate>,
    as_json: bool,
) -> anyhow::Result<()> {
    let mut generator = ScheduleGenerator::new(ScheduleParams::from_env());
    if let Some(seed) = seed {
        generator = generator.with_seed(seed);
    }
    if let Some(today) = today {
        generator = generator.with_today(today);
    }

    let summary = generator.generate(storage, request)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &GenerationSummary) {
    println!("{}", "=== Schedule Generated ===".cyan().bold());
    println!();
    println!("{}: {}", "Plan".white().bold(), summary.plan_id);
    println!("{}: {}", "Generation".white().bold(), summary.generation_id);
    println!("{}: {}", "Total Sessions".white().bold(), summary.total_sessions);
    println!("{}: {}", "Study Sessions".white().bold(), summary.study_sessions);
    println!("{}: {}", "Review Sessions".white().bold(), summary.review_sessions);
    println!("{}: {}", "Mock Exams".white().bold(), summary.mock_exam_sessions);
    println!("{}: {}", "Essay Practice".white().bold(), summary.essay_sessions);
    println!("{}: {}", "Replaced Pending".white().bold(), summary.deleted_sessions);
    if summary.excluded_topics_count > 0 {
        println!("{}: {}", "Excluded Topics".white().bold(), summary.excluded_topics_count);
    }
    if summary.degraded_sessions > 0 {
        println!("{}: {}", "Degraded Sessions".yellow().bold(), summary.degraded_sessions);
    }
    println!("{}: {}ms", "Duration".white().bold(), summary.duration_ms);

    if !summary.warnings.is_empty() {
        println!();
        println!("{}", "=== Warnings ===".yellow().bold());
        for warning in &summary.warnings {
            println!("  {} {}", "!".yellow().bold(), warning);
        }
    }
}

fn run_sessions(storage: &Storage, plan_id: i64, status: Option<String>) -> anyhow::Result<()> {
    let status = match status.as_deref() {
        Some(name) => match SessionStatus::parse_name(name) {
            Some(status) => Some(status),
            None => bail!("unknown session status '{}'", name),
        },
        None => None,
    };

    let sessions = storage.list_sessions(plan_id, status)?;
    if sessions.is_empty() {
        println!("{}", "No sessions found.".dimmed());
        return Ok(());
    }

    let mut current_date = None;
    for session in &sessions {
        if current_date != Some(session.session_date) {
            current_date = Some(session.session_date);
            println!();
            println!(
                "{}",
                session.session_date.format("%a %Y-%m-%d").to_string().cyan().bold()
            );
        }
        let kind = match session.session_type {
            SessionType::NewTopic => "new".green(),
            SessionType::Reinforcement => "reinforce".blue(),
            SessionType::ConsolidatedReview => "review".magenta(),
            SessionType::DirectedMockExam => "mock".yellow(),
            SessionType::EssayPractice => "essay".white(),
        };
        let status = match session.status {
            SessionStatus::Pending => String::new(),
            other => format!(" [{}]", other),
        };
        println!("  {:>5}  {:<10} {}{}", session.id, kind, session.description, status.dimmed());
    }
    println!();
    println!("{} sessions", sessions.len());
    Ok(())
}

fn run_session(storage: &Storage, action: SessionCommand) -> anyhow::Result<()> {
    let (session_id, status) = match action {
        SessionCommand::Start { session_id } => (session_id, SessionStatus::InProgress),
        SessionCommand::Complete { session_id } => (session_id, SessionStatus::Completed),
    };
    storage.set_session_status(session_id, status)?;
    println!("{} session {} -> {}", "Updated".green().bold(), session_id, status);
    Ok(())
}

fn run_exclusions(storage: &Storage, plan_id: i64) -> anyhow::Result<()> {
    let exclusions = storage.list_exclusions(plan_id)?;
    if exclusions.is_empty() {
        println!("{}", "No topics excluded.".dimmed());
        return Ok(());
    }
    for exclusion in exclusions {
        let label = match storage.get_topic(exclusion.topic_id)? {
            Some(topic) => topic.label(),
            None => format!("topic {}", exclusion.topic_id),
        };
        println!("{}  {}", label.white().bold(), exclusion.reason.dimmed());
    }
    Ok(())
}
