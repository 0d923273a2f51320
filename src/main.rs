mod commands;
mod render;
mod tasks_file;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pmsync_core::{DateRange, FsStore, PmSyncConfig, SyncEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pmsync")]
#[command(about = "Mirror project tasks into calendar collections and plan them into working hours")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror every task in the file into the owner's calendar
    Sync {
        /// JSON file holding an array of tasks; event ids are written back
        tasks: PathBuf,

        /// Calendar owner (user id or email)
        #[arg(short, long)]
        owner: String,

        /// Place events into planned working slots instead of now
        #[arg(long)]
        schedule: bool,

        /// First day to plan from when scheduling (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,
    },
    /// Remove a task's event from the owner's calendar
    Unsync {
        tasks: PathBuf,

        #[arg(short, long)]
        owner: String,

        /// Id of the task whose event is removed
        task_id: i64,
    },
    /// Compare tasks against their mirrored events
    Status {
        tasks: PathBuf,

        #[arg(short, long)]
        owner: String,
    },
    /// Plan tasks into weekday working hours
    Schedule {
        tasks: PathBuf,

        /// First day to plan from (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,
    },
    /// List working slots between two dates (inclusive)
    Slots {
        /// YYYY-MM-DD
        from: String,

        /// YYYY-MM-DD
        to: String,
    },
    /// Check a JSON array of assignments for over-booking and weekend work
    Validate { assignments: PathBuf },
    /// Export the owner's calendar as a single ICS feed
    Feed {
        #[arg(short, long)]
        owner: String,

        /// Write to this file instead of stdout
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },
    /// Show config paths and effective settings
    Config,
    /// List events in the owner's calendar
    Events {
        #[arg(short, long)]
        owner: String,

        /// Show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = PmSyncConfig::load()?;
    let json = cli.json;

    match cli.command {
        Commands::Sync {
            tasks,
            owner,
            schedule,
            from,
        } => {
            let start_date = schedule
                .then(|| parse_day_or_today(from.as_deref()))
                .transpose()?;
            commands::sync::run(&engine(config)?, &tasks, &owner, start_date, json).await
        }
        Commands::Unsync {
            tasks,
            owner,
            task_id,
        } => commands::unsync::run(&engine(config)?, &tasks, &owner, task_id, json).await,
        Commands::Status { tasks, owner } => {
            commands::status::run(&engine(config)?, &tasks, &owner, json).await
        }
        Commands::Schedule { tasks, from } => {
            let start_date = parse_day_or_today(from.as_deref())?;
            commands::schedule::run(&config, &tasks, start_date, json)
        }
        Commands::Slots { from, to } => {
            commands::slots::run(&config, parse_day(&from)?, parse_day(&to)?, json)
        }
        Commands::Validate { assignments } => {
            commands::validate::run(&config, &assignments, json)
        }
        Commands::Feed { owner, output } => {
            commands::feed::run(&engine(config)?, &owner, output.as_deref()).await
        }
        Commands::Config => commands::config::run(&config),
        Commands::Events { owner, from, to } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref())?;
            commands::events::run(&engine(config)?, &owner, &range, json).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn engine(config: PmSyncConfig) -> Result<SyncEngine<FsStore>> {
    let store = FsStore::new(config.storage_path());
    Ok(SyncEngine::new(store, config)?)
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}

fn parse_day_or_today(s: Option<&str>) -> Result<NaiveDate> {
    match s {
        Some(s) => parse_day(s),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}
