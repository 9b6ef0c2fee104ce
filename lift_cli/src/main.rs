use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lift_core::history::read_csv_entries;
use lift_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lift")]
#[command(about = "Workout plan recommendations from your own training log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Plan as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend the next workout (default)
    Plan {
        /// Show the first recommendation without saving
        #[arg(long)]
        dry_run: bool,

        /// Only pair a secondary category when history has several
        #[arg(long)]
        single_category: bool,

        /// Accept and save the current plan without prompting
        #[arg(long)]
        auto_accept: bool,

        /// Decline this many plans before auto-accepting (for testing)
        #[arg(long, default_value_t = 0)]
        auto_decline: usize,
    },

    /// Log a single set
    Log {
        /// Category (chest, back, biceps, triceps, shoulders, legs, core, cardio)
        #[arg(long)]
        category: Category,

        /// Exercise display name
        #[arg(long)]
        name: String,

        /// Catalog exercise id
        #[arg(long, conflicts_with = "custom")]
        exercise_id: Option<i64>,

        /// Log as a custom exercise under its name
        #[arg(long)]
        custom: bool,

        #[arg(long)]
        weight: Option<f64>,

        #[arg(long)]
        reps: Option<u32>,

        #[arg(long, default_value_t = 1)]
        set: u32,

        /// Workout date, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Import logged sets from a CSV file
    Import {
        /// CSV file with a header row
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    lift_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let store_path = data_dir.join("logs.jsonl");

    match cli.command {
        Some(Commands::Plan {
            dry_run,
            single_category,
            auto_accept,
            auto_decline,
        }) => cmd_plan(
            store_path,
            today,
            &config,
            PlanOptions {
                dry_run,
                single_category,
                auto_accept,
                auto_decline,
            },
        ),
        Some(Commands::Log {
            category,
            name,
            exercise_id,
            custom,
            weight,
            reps,
            set,
            date,
        }) => {
            if exercise_id.is_none() && !custom {
                return Err(Error::InvalidLog(
                    "pass --exercise-id or --custom to identify the exercise".into(),
                ));
            }
            let entry = LogEntry {
                workout_date: date.unwrap_or(today),
                category,
                exercise_id,
                custom_exercise_name: custom.then(|| name.clone()),
                exercise_name: name,
                set_number: set,
                weight_kg: weight,
                reps,
            };
            JsonlSink::new(&store_path).append(&entry)?;
            println!("✓ Logged {} set {}", entry.exercise_name, entry.set_number);
            Ok(())
        }
        Some(Commands::Import { path }) => {
            let entries = read_csv_entries(&path)?;
            JsonlSink::new(&store_path).append_all(&entries)?;
            println!("✓ Imported {} sets from {}", entries.len(), path.display());
            Ok(())
        }
        None => cmd_plan(store_path, today, &config, PlanOptions::default()),
    }
}

#[derive(Default)]
struct PlanOptions {
    dry_run: bool,
    single_category: bool,
    auto_accept: bool,
    auto_decline: usize,
}

fn cmd_plan(
    store_path: PathBuf,
    today: NaiveDate,
    config: &Config,
    options: PlanOptions,
) -> Result<()> {
    let logs = load_logs(&store_path, None)?;

    let ctx = EngineContext::with_settings(today, config.engine.settings());
    let mut session = PlanSession::new(ctx).multi_category(!options.single_category);
    session.initialize(logs);

    if session.current().is_none() {
        println!("No workouts logged yet - log a few sets and come back for a plan.");
        return Ok(());
    }

    let mut declined = 0;
    loop {
        let Some(plan) = session.current() else {
            return Ok(());
        };
        display_plan(plan, session.current_index());

        if options.dry_run {
            println!("\n[Dry run - not saving plan]");
            return Ok(());
        }

        let action = if options.auto_accept {
            if declined < options.auto_decline {
                declined += 1;
                UserAction::Decline
            } else {
                UserAction::Accept
            }
        } else {
            prompt_user_action()?
        };

        match action {
            UserAction::Accept => {
                let rows = plan_to_log_entries(plan, today);
                JsonlSink::new(&store_path).append_all(&rows)?;
                println!("\n✓ Plan saved ({} sets logged)", rows.len());
                return Ok(());
            }
            UserAction::Decline => match session.advance() {
                Advance::Exhausted => {
                    println!("\nNo more alternative plans - keeping this one.");
                }
                outcome => {
                    if outcome.is_new() {
                        println!("\nGenerated a fresh alternative...");
                    } else {
                        println!("\nShowing next option...");
                    }
                }
            },
            UserAction::Edit {
                index,
                weight_kg,
                reps,
            } => {
                let Some(mut exercise) = plan.exercises.get(index).cloned() else {
                    println!("\nNo exercise #{} in this plan.", index + 1);
                    continue;
                };
                exercise.sets = [SetScheme::new(weight_kg, reps); 3];
                let name = exercise.name.clone();
                if session.update_exercise(exercise) {
                    println!("\n✓ Updated {}", name);
                }
            }
            UserAction::Quit => return Ok(()),
        }
    }
}

fn display_plan(plan: &Plan, index: usize) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  OPTION {}: {}", index + 1, plan.name);
    println!("╰─────────────────────────────────────────╯");
    println!("  {}", plan.description);
    println!();

    for (i, exercise) in plan.exercises.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, exercise.name, exercise.category);
        let sets: Vec<String> = exercise
            .sets
            .iter()
            .map(|s| format!("{}kg x {}", s.weight_kg, s.reps))
            .collect();
        println!("     → {}", sets.join(" | "));
        if let Some(last) = exercise.last_used {
            println!("     last done {}", last);
        }
    }

    println!();
}

enum UserAction {
    Accept,
    Decline,
    Edit {
        index: usize,
        weight_kg: f64,
        reps: u32,
    },
    Quit,
}

fn prompt_user_action() -> Result<UserAction> {
    loop {
        println!("─────────────────────────────────────────");
        println!("Press Enter to accept and save");
        println!("  'n' + Enter for another plan");
        println!("  'e <#> <kg> <reps>' + Enter to edit an exercise");
        println!("  'q' + Enter to quit");
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(UserAction::Quit);
        }

        match parse_action(&input) {
            Some(action) => return Ok(action),
            None => println!("Didn't catch that, try again."),
        }
    }
}

fn parse_action(input: &str) -> Option<UserAction> {
    let mut parts = input.split_whitespace();
    match parts.next().map(str::to_lowercase).as_deref() {
        None => Some(UserAction::Accept),
        Some("n") => Some(UserAction::Decline),
        Some("q") => Some(UserAction::Quit),
        Some("e") => {
            let index: usize = parts.next()?.parse().ok()?;
            let weight_kg: f64 = parts.next()?.parse().ok()?;
            let reps: u32 = parts.next()?.parse().ok()?;
            Some(UserAction::Edit {
                index: index.checked_sub(1)?,
                weight_kg,
                reps,
            })
        }
        Some(_) => None,
    }
}
