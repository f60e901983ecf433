use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand, ValueEnum};
use dispatch_core::audit::TracingAuditSink;
use dispatch_core::directory::InMemoryDirectory;
use dispatch_core::matching::{RankingPolicyKind, RideContext};
use dispatch_core::model::RideRequest;
use dispatch_core::{Dispatcher, MatchConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod export;

use export::{export_report, OutputFormat};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "dispatch",
    about = "Rank volunteer drivers for a ride request",
    long_about = "Matches one ride request against a directory snapshot and prints every\n\
                  candidate driver as either ranked-available or excluded with a reason."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a ride against a directory snapshot
    Match(MatchArgs),
    /// Check a ride request without matching it
    Validate {
        /// Ride request JSON file
        #[arg(long)]
        ride: PathBuf,
        /// Matching config TOML (area key settings)
        #[arg(long, env = "DISPATCH_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct MatchArgs {
    /// Directory snapshot JSON (drivers, time off, ride history)
    #[arg(long)]
    snapshot: PathBuf,
    /// Ride request JSON file
    #[arg(long)]
    ride: PathBuf,
    /// Evaluation instant, e.g. 2026-10-19T08:00:00 (defaults to local now)
    #[arg(long, value_parser = parse_now)]
    now: Option<NaiveDateTime>,
    /// Matching config TOML
    #[arg(long, env = "DISPATCH_CONFIG")]
    config: Option<PathBuf>,
    /// Override the configured ranking policy
    #[arg(value_enum, long)]
    policy: Option<PolicyArg>,
    /// Output format
    #[arg(value_enum, long, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Weighted rotation score
    Weighted,
    /// Town preference, then least recent drive
    TownPreference,
}

impl From<PolicyArg> for RankingPolicyKind {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Weighted => Self::Weighted,
            PolicyArg::TownPreference => Self::TownPreference,
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn parse_now(raw: &str) -> Result<NaiveDateTime, String> {
    raw.parse::<NaiveDateTime>()
        .map_err(|err| format!("expected YYYY-MM-DDTHH:MM:SS: {err}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(MatchConfig::load(path)?),
        None => Ok(MatchConfig::default()),
    }
}

fn read_ride(path: &Path) -> Result<RideRequest, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

// ── commands ───────────────────────────────────────────────────────

fn run_match(args: &MatchArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(policy) = args.policy {
        config = config.with_ranking_policy(policy.into());
    }
    let ride = read_ride(&args.ride)?;
    let directory = InMemoryDirectory::load(&args.snapshot)?;
    let now = args
        .now
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    let dispatcher = Dispatcher::new(directory, TracingAuditSink, &config);
    let report = dispatcher.run(&ride, now)?;

    export_report(&report, args.format, args.output.as_deref())?;
    if let Some(path) = &args.output {
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_validate(ride: &Path, config: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = load_config(config)?;
    let ride = read_ride(ride)?;
    let keyer = config.area_keyer();
    let context = RideContext::prepare(&ride, &keyer)?;

    println!(
        "ride {} is valid: {} seat(s), pickup area {}, dropoff area {}",
        ride.id, context.requirements.seats, context.pickup_area, context.dropoff_area
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match &cli.command {
        Commands::Match(args) => run_match(args),
        Commands::Validate { ride, config } => run_validate(ride, config.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
