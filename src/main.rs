//! Barrio Scout main entry point
//!
//! This is the command-line interface for nearby small-business discovery.

use barrio_scout::config::{load_config_with_hash, Config};
use barrio_scout::discovery::{DiscoveryOutcome, PollingCoordinator};
use barrio_scout::geo::Coordinate;
use barrio_scout::output;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Exit code when a session ends with no results within the deadline
const EXIT_NO_RESULTS: u8 = 2;

/// Barrio Scout: find small businesses near a point
///
/// Dispatches an external scrape job, waits for its rows to land in the
/// shared results feed, and prints the scored candidates within the radius.
#[derive(Parser, Debug)]
#[command(name = "barrio-scout")]
#[command(version)]
#[command(about = "Nearby small-business discovery", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch a scrape and wait for nearby results
    Discover {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Business type to search for (e.g. "panaderia")
        #[arg(long = "type", value_name = "TYPE")]
        business_type: String,
    },

    /// Filter the current results feed without dispatching
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Radius in kilometers (defaults to the configured radius)
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Validate the configuration and show what a discovery would do
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Check => {
            handle_check(&config);
            Ok(ExitCode::SUCCESS)
        }
        Command::Nearby { lat, lng, radius } => {
            let origin = Coordinate::new(lat, lng)?;
            handle_nearby(&config, origin, radius, cli.format).await
        }
        Command::Discover {
            lat,
            lng,
            business_type,
        } => {
            let origin = Coordinate::new(lat, lng)?;
            handle_discover(&config, origin, &business_type, cli.format).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout only carries results.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("barrio_scout=info,warn"),
            1 => EnvFilter::new("barrio_scout=debug,info"),
            2 => EnvFilter::new("barrio_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `check`: prints the effective configuration
fn handle_check(config: &Config) {
    println!("=== Barrio Scout Configuration ===\n");

    println!("Dispatch:");
    println!("  Trigger: {}", config.dispatch.trigger_url);
    println!("  Pending-work feed: {}", config.dispatch.pending_feed_url);
    println!("  Job URL base: {}", config.dispatch.search_base_url);
    println!("  Trigger required: {}", config.dispatch.require_trigger);

    println!("\nResults feed:");
    println!("  URL: {}", config.results_feed.url);
    println!(
        "  Coordinates column: {}",
        config.results_feed.columns.coordinates
    );

    println!("\nPolling:");
    println!("  Radius: {} km", config.polling.radius_km);
    println!("  Interval: {}ms", config.polling.interval_ms);
    println!("  Deadline: {}ms", config.polling.deadline_ms);
    println!("  Initial delay: {}ms", config.polling.initial_delay_ms);
    println!("  Match mode: {:?}", config.polling.match_mode);

    println!("\n✓ Configuration is valid");
}

/// Handles `nearby`: one snapshot, filtered and scored
async fn handle_nearby(
    config: &Config,
    origin: Coordinate,
    radius: Option<f64>,
    format: Format,
) -> anyhow::Result<ExitCode> {
    let radius_km = radius.unwrap_or(config.polling.radius_km);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        anyhow::bail!("radius must be a positive number of kilometers, got {}", radius_km);
    }

    let coordinator = PollingCoordinator::from_config(config)?;
    let candidates = coordinator.discover_near_existing(origin, radius_km).await?;

    match format {
        Format::Json => println!("{}", output::render_candidates_json(&candidates)?),
        Format::Text => print!("{}", output::render_candidates_text(&candidates, origin)),
    }

    Ok(ExitCode::SUCCESS)
}

/// Handles `discover`: dispatch, poll, and print the report
async fn handle_discover(
    config: &Config,
    origin: Coordinate,
    business_type: &str,
    format: Format,
) -> anyhow::Result<ExitCode> {
    let coordinator = PollingCoordinator::from_config(config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling discovery");
            on_signal.cancel();
        }
    });

    let report = match coordinator.discover(origin, business_type, &cancel).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", output::user_message(&e));
            tracing::error!("Discovery failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    match format {
        Format::Json => println!("{}", output::render_report_json(&report)?),
        Format::Text => print!("{}", output::render_report_text(&report)),
    }

    if matches!(report.outcome, DiscoveryOutcome::NoMatchWithinDeadline) {
        eprintln!("{}", output::NO_RESULTS_MESSAGE);
        return Ok(ExitCode::from(EXIT_NO_RESULTS));
    }

    Ok(ExitCode::SUCCESS)
}
