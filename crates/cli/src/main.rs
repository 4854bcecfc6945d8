//! `calbot`: turn batches of chat announcements into calendar entries.
//!
//! Summaries go to stdout with `println!`; everything else is structured
//! logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use calbot_domain::SyncSummary;
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use tracing::error;

mod adapters;
mod logging;
mod pipeline;

use adapters::{user_directory, LiveAdapters};
use pipeline::{Pipeline, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "calbot", version, about)]
struct Cli {
    /// Configuration file (TOML or JSON); searched for in the working directory
    /// when omitted
    #[arg(short, long, global = true, env = "CALBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize and merge collected messages (stage 1 -> stage 2)
    Aggregate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        users: UserMapArgs,
    },
    /// Extract event candidates (stage 2 -> stage 3)
    Extract {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write extracted events to the calendar
    Sync {
        /// Stage-3 events file
        #[arg(short, long)]
        events: PathBuf,
        /// Stage-2 file holding the permalinks; defaults to the sibling of
        /// the events file
        #[arg(short, long)]
        messages: Option<PathBuf>,
        /// Replace same-day entries with the same title
        #[arg(long)]
        overwrite: bool,
    },
    /// Run every stage for one time range
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct UserMapArgs {
    /// JSON object mapping user ids to display names
    #[arg(long)]
    user_map: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Start of the batch, e.g. 2025-10-20T00:00
    #[arg(long, value_parser = parse_datetime)]
    start: NaiveDateTime,
    /// End of the batch (inclusive)
    #[arg(long, value_parser = parse_datetime)]
    end: NaiveDateTime,
    /// Collected messages; defaults to the stage-1 file in the output
    /// directory
    #[arg(long)]
    messages: Option<PathBuf>,
    /// Directory for stage files; overrides `output.directory`
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Reuse stage files already present for this range
    #[arg(long)]
    use_cache: bool,
    /// Stop after extraction
    #[arg(long)]
    skip_calendar: bool,
    /// Replace same-day entries with the same title
    #[arg(long)]
    overwrite: bool,
    #[command(flatten)]
    users: UserMapArgs,
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 4] =
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("'{value}' is not a date-time like 2025-10-20T09:00"))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_json) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = format!("{e:#}"), "calbot failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = calbot_infra::config::load(cli.config).context("loading configuration")?;
    let adapters = LiveAdapters::new(config.clone());

    match cli.command {
        Command::Aggregate { input, output, users } => {
            let pipeline = Pipeline::new(config, user_directory(users.user_map.as_deref())?);
            let count = pipeline.aggregate_file(&input, &output).await?;
            println!("Aggregated into {count} messages: {}", output.display());
        }
        Command::Extract { input, output } => {
            let pipeline = Pipeline::new(config, user_directory(None)?);
            let events = pipeline.extract_file(&adapters, &input, &output).await?;
            println!("Extracted {events} events: {}", output.display());
        }
        Command::Sync { events, messages, overwrite } => {
            let pipeline = Pipeline::new(config, user_directory(None)?);
            let summary =
                pipeline.sync_file(&adapters, &events, messages.as_deref(), overwrite).await?;
            print_summary(&summary);
        }
        Command::Run(args) => {
            let output_dir = args
                .output_dir
                .unwrap_or_else(|| Path::new(&config.output.directory).to_path_buf());
            let options = RunOptions {
                start: args.start,
                end: args.end,
                messages: args.messages,
                output_dir,
                use_cache: args.use_cache,
                skip_calendar: args.skip_calendar,
                overwrite: args.overwrite,
            };
            let pipeline = Pipeline::new(config, user_directory(args.users.user_map.as_deref())?);
            let report = pipeline.run(&adapters, &options).await?;

            println!(
                "Processed {} messages into {} aggregated messages with {} events",
                report.messages, report.aggregated, report.events
            );
            match report.sync {
                Some(summary) => print_summary(&summary),
                None => println!("Calendar sync skipped"),
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!(
        "Calendar sync: {} created, {} duplicates, {} errors",
        summary.created, summary.duplicates, summary.errors
    );
}
