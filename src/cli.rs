use crate::batch::{BatchExecutor, BatchOptions, JoinMode, Outcome, RunSummary};
use crate::log::{ActivityLogger, LogLevel};
use crate::simulate::{self, User, Workload};
use crate::{runtime, ApiResponse};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "batchrun", version, about = "Bounded-concurrency batch runs (JSON only)")]
pub struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulated user lookup over ids 1..=N
    Simulate(SimulateArgs),
    /// Show recorded runs, newest first
    History(HistoryArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// Number of items to process
    #[arg(long, default_value_t = 100)]
    items: u64,
    /// Maximum in-flight operations (overrides --options)
    #[arg(long)]
    concurrency: Option<usize>,
    /// Keep going on failures and report them per item
    #[arg(long)]
    settled: bool,
    /// Upper bound for each lookup's random delay
    #[arg(long, default_value_t = 100)]
    max_delay_ms: u64,
    /// Make every id divisible by N fail
    #[arg(long)]
    fail_every: Option<u64>,
    /// JSON file with executor options
    #[arg(long)]
    options: Option<PathBuf>,
    /// Include per-item outcomes in the output
    #[arg(long)]
    show_results: bool,
}

#[derive(Args)]
struct HistoryArgs {
    /// Only failed runs
    #[arg(long)]
    errors: bool,
    /// Only runs in this mode (settled | all-or-fail)
    #[arg(long)]
    mode: Option<String>,
}

#[derive(Serialize)]
struct SimulateOutput {
    options: BatchOptions,
    summary: RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<Outcome<User, String>>>,
}

pub fn run() {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Simulate(args) => finish(simulate_cmd(args)),
        Command::History(args) => finish(history_cmd(args)),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("batchrun=info"));
    // stdout carries JSON only
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn resolve_options(args: &SimulateArgs) -> anyhow::Result<BatchOptions> {
    let mut options = match &args.options {
        Some(path) => BatchOptions::from_json_file(path)
            .with_context(|| format!("reading options from {}", path.display()))?,
        None => BatchOptions::default(),
    };
    if let Some(concurrency) = args.concurrency {
        options.concurrency = concurrency;
    }
    if args.settled {
        options.mode = JoinMode::Settled;
    }
    Ok(options)
}

fn simulate_cmd(args: SimulateArgs) -> anyhow::Result<SimulateOutput> {
    let options = resolve_options(&args)?;
    let workload = Workload {
        max_delay_ms: args.max_delay_ms,
        fail_every: args.fail_every,
    };
    let mode = options.mode.name();

    let start_time = Instant::now();
    let executor = BatchExecutor::new(options.clone());
    let result = runtime::block_on(executor.run(1..=args.items, move |id: u64| {
        simulate::fetch_user_by_id(id, workload)
    }));
    let duration = start_time.elapsed();

    match &result {
        Ok(report) => {
            let details = format!(
                "succeeded in {}ms ({} items, {} chunks, {} failed)",
                duration.as_millis(),
                report.len(),
                report.chunk_count,
                report.failed()
            );
            record(LogLevel::Info, mode, &details);
        }
        Err(e) => {
            let details = format!("failed in {}ms: {}", duration.as_millis(), e);
            record(LogLevel::Error, mode, &details);
        }
    }

    let report = result?;
    Ok(SimulateOutput {
        options,
        summary: report.summary(),
        results: args.show_results.then_some(report.results),
    })
}

fn history_cmd(args: HistoryArgs) -> anyhow::Result<Vec<String>> {
    let logger = ActivityLogger::new()?;
    Ok(logger.read_logs(args.mode.as_deref(), args.errors)?)
}

// Run history is best effort; a broken log must not fail the run.
fn record(level: LogLevel, mode: &str, details: &str) {
    let written = ActivityLogger::new()
        .and_then(|logger| logger.log(level, Some(mode), "simulate", Some(details)));
    if let Err(e) = written {
        debug!(error = %e, "could not write run history");
    }
}

fn finish<T: Serialize>(res: anyhow::Result<T>) {
    match res {
        Ok(v) => print_json(ApiResponse::ok(v)),
        Err(e) => {
            print_json(ApiResponse::<()>::err(format!("{e:#}")));
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(val: T) {
    match serde_json::to_string_pretty(&val) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: could not serialize output: {}", e),
    }
}
