//! CLI interface for megaverse.
//!
//! Each subcommand is non-interactive: arguments in, objects created or
//! deleted, a summary out. Per-object progress goes to stderr through the log
//! subscriber; plans and summaries go to stdout.

mod format;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::{Client, Megaverse};
use crate::cleanup::{self, CleanupOutcome};
use crate::config::Config;
use crate::create;
use crate::goal;
use crate::model::GridObject;
use crate::pattern::{self, DEFAULT_CROSS_SIZE};
use crate::retry::ThreadSleeper;
use crate::storage::CreationLog;

use format::{format_cleanup_report, format_create_report, format_plan};

/// Megaverse: build the goal map, then clean up after yourself.
#[derive(Debug, Parser)]
#[command(name = "megaverse", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Config file (defaults to `~/.megaverse/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Candidate id. Overrides `CANDIDATE_ID` and the config file.
    #[arg(long, global = true)]
    candidate_id: Option<String>,

    /// Creation log path. Overrides the config file.
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. megaverse plan                  # inspect what the goal map asks for
  2. megaverse create                # create it, logging every success
  3. megaverse cleanup               # delete everything in the log
     (rerun cleanup to retry whatever failed)

The first phase's X shape:
  megaverse cross --size 11";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the goal map and print the objects it asks for.
    Plan,

    /// Fetch the goal map and create every object in it.
    ///
    /// Each created object is appended to the creation log.
    /// Failures are reported and skipped.
    Create {
        /// Print what would be created without calling the API.
        #[arg(long)]
        dry_run: bool,

        /// Pause between create calls, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Create an X of polyanets centered in a square grid.
    Cross {
        /// Side length of the grid. Must be odd.
        #[arg(long, default_value_t = DEFAULT_CROSS_SIZE)]
        size: u32,

        /// Print what would be created without calling the API.
        #[arg(long)]
        dry_run: bool,

        /// Pause between create calls, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Delete every object recorded in the creation log.
    ///
    /// Rate-limited deletes are retried. The log is rewritten to hold
    /// only what could not be deleted.
    Cleanup {
        /// Attempts per object, including the first.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: Option<u32>,

        /// Wait after a rate-limited attempt, in milliseconds.
        #[arg(long)]
        retry_delay_ms: Option<u64>,

        /// Pause between objects, in milliseconds.
        #[arg(long)]
        object_delay_ms: Option<u64>,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    let log = CreationLog::new(cli.log.unwrap_or_else(|| config.log_path()));

    match cli.command {
        Command::Plan => cmd_plan(&config, cli.candidate_id.as_deref()),
        Command::Create { dry_run, delay_ms } => {
            let delay = delay_ms.map_or_else(|| config.create_delay(), Duration::from_millis);
            let client = connect(&config, cli.candidate_id.as_deref())?;
            let objects = fetch_objects(&client)?;
            if dry_run {
                print!("{}", format_plan(&objects, true));
                return Ok(());
            }
            cmd_create(&client, &objects, &log, delay)
        }
        Command::Cross {
            size,
            dry_run,
            delay_ms,
        } => {
            let objects = pattern::cross(size).map_err(|e| e.to_string())?;
            if dry_run {
                print!("{}", format_plan(&objects, true));
                return Ok(());
            }
            let delay = delay_ms.map_or_else(|| config.create_delay(), Duration::from_millis);
            let client = connect(&config, cli.candidate_id.as_deref())?;
            cmd_create(&client, &objects, &log, delay)
        }
        Command::Cleanup {
            max_attempts,
            retry_delay_ms,
            object_delay_ms,
        } => {
            let mut options = config.cleanup_options().map_err(|e| e.to_string())?;
            if let Some(n) = max_attempts {
                options.retry.max_attempts = n;
            }
            if let Some(ms) = retry_delay_ms {
                options.retry.delay = Duration::from_millis(ms);
            }
            if let Some(ms) = object_delay_ms {
                options.object_delay = Duration::from_millis(ms);
            }
            let client = connect(&config, cli.candidate_id.as_deref())?;
            cmd_cleanup(&client, &log, &options)
        }
    }
}

/// Resolve credentials and build the HTTP client. All configuration errors
/// surface here, before any request is made.
fn connect(config: &Config, candidate_id: Option<&str>) -> Result<Client, String> {
    let candidate_id = config.candidate_id(candidate_id).map_err(|e| e.to_string())?;
    Client::new(config.base_url(), &candidate_id, config.timeout())
        .map_err(|e| format!("failed to build HTTP client: {e}"))
}

fn fetch_objects(client: &Client) -> Result<Vec<GridObject>, String> {
    info!("fetching goal map");
    let map = client
        .fetch_goal()
        .map_err(|e| format!("failed to fetch goal map: {e}"))?;
    let objects = goal::parse(&map);
    info!(count = objects.len(), "parsed goal map");
    Ok(objects)
}

fn cmd_plan(config: &Config, candidate_id: Option<&str>) -> Result<(), String> {
    let client = connect(config, candidate_id)?;
    let objects = fetch_objects(&client)?;
    print!("{}", format_plan(&objects, false));
    Ok(())
}

fn cmd_create(
    client: &Client,
    objects: &[GridObject],
    log: &CreationLog,
    delay: Duration,
) -> Result<(), String> {
    let report = create::create_objects(client, objects, log, delay, &mut ThreadSleeper)
        .map_err(|e| format!("failed to record created object: {e}"))?;
    print!("{}", format_create_report(&report, objects.len(), log.path()));
    Ok(())
}

fn cmd_cleanup(
    client: &Client,
    log: &CreationLog,
    options: &cleanup::CleanupOptions,
) -> Result<(), String> {
    let outcome = cleanup::cleanup(client, log, options, &mut ThreadSleeper)
        .map_err(|e| format!("failed to rewrite {}: {e}", log.path().display()))?;

    match outcome {
        CleanupOutcome::NothingToDo => {
            println!("Nothing to clean up in {}.", log.path().display());
        }
        CleanupOutcome::Finished(report) => {
            print!("{}", format_cleanup_report(&report, log.path()));
        }
    }
    Ok(())
}
