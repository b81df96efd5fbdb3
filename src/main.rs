use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use radcase_review::config::Config;
use radcase_review::database::seed::seed_sample_cases;
use radcase_review::models::{AttemptRequest, Case, CaseFilter, DueSet, ProgressSummary, QuizStats};
use radcase_review::{ReviewError, SqliteStore, record_attempt, select_due_cases};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "radcase-review",
    about = "Radiology teaching case review and quiz scheduling",
    version
)]
struct Cli {
    /// Database file (default: from config, then the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the case catalog
    #[command(subcommand)]
    Case(CaseCommand),

    /// Add sample cases to an empty catalog
    Seed,

    /// Record a quiz attempt
    Attempt {
        case_id: String,
        outcome: Outcome,
        /// Time spent on the question in milliseconds
        #[arg(long)]
        time_ms: Option<i64>,
        /// Learner to reschedule the case for
        #[arg(long)]
        learner: Option<String>,
    },

    /// List cases due for review, topped up with new ones
    Due {
        #[arg(long)]
        learner: Option<String>,
        /// Batch size (default: review.default_limit from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Pick a random quiz case
    Random {
        #[arg(long)]
        modality: Option<String>,
        #[arg(long)]
        body_part: Option<String>,
        #[arg(long)]
        difficulty: Option<u8>,
    },

    /// Quiz statistics, overall or for one learner
    Stats {
        #[arg(long)]
        learner: Option<String>,
    },

    /// Progress summary for a learner
    Progress {
        #[arg(long)]
        learner: Option<String>,
    },
}

#[derive(Subcommand)]
enum CaseCommand {
    /// Add a case
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        modality: Option<String>,
        #[arg(long)]
        body_part: Option<String>,
        #[arg(long)]
        diagnosis: Option<String>,
        #[arg(long, default_value_t = 2)]
        difficulty: u8,
        #[arg(long)]
        history: Option<String>,
        #[arg(long)]
        findings: Option<String>,
        #[arg(long)]
        teaching_points: Option<String>,
    },
    /// List all cases
    List,
    /// Show one case
    Show { id: String },
    /// Delete a case with its attempts and review states
    Delete { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Exit status 2 for errors the caller can fix, 1 otherwise.
fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<ReviewError>() {
        Some(e) if e.is_caller_error() => 2,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let db_path = cli
        .db
        .clone()
        .or_else(|| config.db_path())
        .context("No database path configured")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    let mut store = SqliteStore::open(&db_path)?;
    let format = cli.format;

    match cli.command {
        Command::Case(command) => run_case_command(&store, command, format)?,
        Command::Seed => {
            if store.case_count()? > 0 {
                println!("Catalog already has cases, nothing seeded.");
            } else {
                let added = seed_sample_cases(&store)?;
                println!("Sample data created: {added} cases");
            }
        }
        Command::Attempt {
            case_id,
            outcome,
            time_ms,
            learner,
        } => {
            let request = AttemptRequest {
                case_id: Some(case_id),
                correct: matches!(outcome, Outcome::Correct),
                time_spent_ms: time_ms,
                learner_id: learner,
            };
            let recorded = record_attempt(&mut store, &request, Utc::now())?;
            match format {
                OutputFormat::Json => print_json(&recorded.state)?,
                OutputFormat::Plain => match recorded.state {
                    Some(state) => println!(
                        "Attempt recorded. Next review {} (in {} days, repetitions {})",
                        state.next_review_date, state.interval_days, state.repetitions
                    ),
                    None => println!("Attempt recorded."),
                },
            }
        }
        Command::Due { learner, limit } => {
            let limit = limit.unwrap_or(config.review.default_limit);
            let set = select_due_cases(&store, learner.as_deref(), limit, Utc::now().date_naive())?;
            match format {
                OutputFormat::Json => print_json(&set)?,
                OutputFormat::Plain => print_due_set(&set),
            }
        }
        Command::Random {
            modality,
            body_part,
            difficulty,
        } => {
            let filter = CaseFilter {
                modality,
                body_part,
                difficulty,
            };
            let Some(case) = store.random_case(&filter)? else {
                bail!("No cases found matching criteria");
            };
            match format {
                OutputFormat::Json => print_json(&case)?,
                OutputFormat::Plain => print_case(&case),
            }
        }
        Command::Stats { learner } => {
            let stats = store.quiz_stats(learner.as_deref())?;
            match format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Plain => print_stats(&stats),
            }
        }
        Command::Progress { learner } => {
            let Some(learner) = learner.filter(|l| !l.trim().is_empty()) else {
                return Err(ReviewError::Unauthenticated.into());
            };
            let summary = store.progress_summary(&learner)?;
            match format {
                OutputFormat::Json => print_json(&summary)?,
                OutputFormat::Plain => print_progress(&summary),
            }
        }
    }

    Ok(())
}

fn run_case_command(
    store: &SqliteStore,
    command: CaseCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        CaseCommand::Add {
            title,
            modality,
            body_part,
            diagnosis,
            difficulty,
            history,
            findings,
            teaching_points,
        } => {
            let mut case = Case::new(title);
            case.modality = modality;
            case.body_part = body_part;
            case.diagnosis = diagnosis;
            case.difficulty = difficulty;
            case.clinical_history = history;
            case.findings = findings;
            case.teaching_points = teaching_points;
            store.insert_case(&case)?;
            match format {
                OutputFormat::Json => print_json(&case)?,
                OutputFormat::Plain => {
                    println!("Case '{}' created with id {}", case.title, case.id)
                }
            }
        }
        CaseCommand::List => {
            let cases = store.list_cases()?;
            match format {
                OutputFormat::Json => print_json(&cases)?,
                OutputFormat::Plain => {
                    println!("{} cases", cases.len());
                    for case in &cases {
                        println!(
                            "  {}  {} [{}] difficulty {}",
                            case.id,
                            case.title,
                            case.modality.as_deref().unwrap_or("-"),
                            case.difficulty
                        );
                    }
                }
            }
        }
        CaseCommand::Show { id } => {
            let Some(case) = store.get_case(&id)? else {
                bail!("Case not found: {id}");
            };
            match format {
                OutputFormat::Json => print_json(&case)?,
                OutputFormat::Plain => print_case(&case),
            }
        }
        CaseCommand::Delete { id } => {
            if !store.delete_case(&id)? {
                bail!("Case not found: {id}");
            }
            println!("Case {id} deleted.");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_case(case: &Case) {
    println!("{} ({})", case.title, case.id);
    println!(
        "  {} / {} / difficulty {}",
        case.modality.as_deref().unwrap_or("-"),
        case.body_part.as_deref().unwrap_or("-"),
        case.difficulty
    );
    if let Some(history) = &case.clinical_history {
        println!("  History: {history}");
    }
    if let Some(diagnosis) = &case.diagnosis {
        println!("  Diagnosis: {diagnosis}");
    }
}

fn print_due_set(set: &DueSet) {
    println!("Due: {}", set.total_due());
    for due in &set.due {
        println!(
            "  {}  {} (due {}, repetitions {}, interval {}d)",
            due.case.id, due.case.title, due.next_review_date, due.repetitions, due.interval_days
        );
    }
    println!("New: {}", set.total_new());
    for case in &set.new {
        println!("  {}  {}", case.id, case.title);
    }
}

fn print_stats(stats: &QuizStats) {
    let overall = &stats.overall;
    println!(
        "{} attempts, {} correct{}",
        overall.total_attempts,
        overall.correct_count,
        overall
            .avg_time_ms
            .map(|ms| format!(", avg {:.1}s", ms / 1000.0))
            .unwrap_or_default()
    );
    for row in &stats.by_difficulty {
        println!(
            "  difficulty {}: {}/{} correct",
            row.difficulty, row.correct, row.attempts
        );
    }
    if !stats.recent_misses.is_empty() {
        println!("Most missed:");
        for miss in &stats.recent_misses {
            println!("  {} ({} misses)", miss.title, miss.miss_count);
        }
    }
}

fn print_progress(summary: &ProgressSummary) {
    println!(
        "{} attempts, {}% accuracy across {} cases",
        summary.total_attempts, summary.accuracy, summary.unique_cases
    );
    println!(
        "Mastered: {}  Learning: {}",
        summary.mastered_cases, summary.learning_cases
    );
    for day in &summary.activity {
        println!("  {}  {}", day.day, day.attempts);
    }
}
