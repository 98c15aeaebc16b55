pub mod config;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fuelsync::{MatchStrategy, Reconciler, SyncReport};
use lubelogger::{LubeLoggerApi, LubeLoggerClient, Vehicle};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::resolve_api_config;

/// Runs the command line interface: syncs every LubeLogger vehicle with its Road Trip export.
pub async fn run_cli() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let api_config = resolve_api_config(
        cli.api_uri.clone(),
        cli.authorization.clone(),
        cli.config.as_deref(),
        Duration::from_secs(cli.timeout_secs),
    )?;
    let client = LubeLoggerClient::new(&api_config).context("failed to build LubeLogger client")?;

    debug!(uri = %client.api_uri(), "Loading vehicles from LubeLogger API");

    let summary = tokio::select! {
        summary = sync_all(&client, &cli.csvpath, cli.match_strategy.into()) => summary?,
        _ = signal::ctrl_c() => {
            anyhow::bail!("interrupted; vehicles already synced are unaffected");
        }
    };

    info!(
        vehicles = summary.vehicles,
        synced = summary.synced,
        skipped = summary.skipped,
        incomplete = summary.incomplete,
        failed = summary.failed,
        inserted = summary.inserted,
        "Sync finished"
    );

    if !summary.is_success() {
        anyhow::bail!(
            "{} vehicle(s) failed and {} stopped early",
            summary.failed,
            summary.incomplete
        );
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Copies Road Trip fillups into LubeLogger")]
struct Cli {
    /// Directory holding the Road Trip CSV exports
    #[arg(long, default_value = "./testdata/CSV")]
    csvpath: PathBuf,
    /// Verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// LubeLogger API base URL, e.g. https://lubelogger.example.com/api
    #[arg(long, env = "API_URI")]
    api_uri: Option<String>,
    /// Credential sent in the x-api-key header
    #[arg(long, env = "AUTHORIZATION", hide_env_values = true)]
    authorization: Option<String>,
    /// JSON config file used when the API URI or credential is missing
    #[arg(long, env = "RT2LL_CONFIG")]
    config: Option<PathBuf>,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// How Road Trip fillups are matched with LubeLogger gas records
    #[arg(long, value_enum, default_value_t = StrategyArg::Odometer)]
    match_strategy: StrategyArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Odometer,
    OdometerAndDate,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Odometer => MatchStrategy::Odometer,
            StrategyArg::OdometerAndDate => MatchStrategy::OdometerAndDate,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

/// Totals for one run over all vehicles.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub vehicles: usize,
    /// Vehicles without an associated Road Trip export.
    pub skipped: usize,
    pub synced: usize,
    /// Vehicles whose sync ran but stopped before finishing its queue.
    pub incomplete: usize,
    pub failed: usize,
    pub inserted: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.incomplete == 0
    }

    fn record(&mut self, report: &SyncReport) {
        self.inserted += report.inserted;
        if report.is_clean() {
            self.synced += 1;
        } else {
            self.incomplete += 1;
        }
    }
}

/// Syncs every vehicle LubeLogger knows about, one at a time.
///
/// Only failing to list the vehicles is fatal; a vehicle whose export or gas records cannot
/// be loaded is logged and counted, and the run moves on.
pub async fn sync_all<A>(
    api: &A,
    csv_dir: &Path,
    strategy: MatchStrategy,
) -> anyhow::Result<RunSummary>
where
    A: LubeLoggerApi + ?Sized,
{
    let vehicles = api
        .vehicles()
        .await
        .context("Error loading LubeLogger vehicles")?;
    info!(vehicle_count = vehicles.len(), "Loaded vehicles from LubeLogger API");

    let reconciler = Reconciler::new(api).with_strategy(strategy);
    let mut summary = RunSummary {
        vehicles: vehicles.len(),
        ..RunSummary::default()
    };

    for vehicle in &vehicles {
        let filename = vehicle.csv_filename();
        info!(
            id = vehicle.id,
            year = vehicle.year,
            make = %vehicle.make,
            model = %vehicle.model,
            filename = filename.unwrap_or_default(),
            "Evaluating LubeLogger vehicle"
        );

        let Some(filename) = filename else {
            summary.skipped += 1;
            continue;
        };

        match sync_vehicle(&reconciler, vehicle, &csv_dir.join(filename)).await {
            Ok(report) => {
                log_report(&report);
                summary.record(&report);
            }
            Err(err) => {
                error!(vehicle_id = vehicle.id, filename, error = %format!("{err:#}"), "Error syncing fuel records");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn sync_vehicle<A>(
    reconciler: &Reconciler<'_, A>,
    vehicle: &Vehicle,
    csv_path: &Path,
) -> anyhow::Result<SyncReport>
where
    A: LubeLoggerApi + ?Sized,
{
    let roadtrip = roadtrip::load_vehicle(csv_path)
        .with_context(|| format!("Error loading Road Trip export {}", csv_path.display()))?;
    debug!(
        vehicle_id = vehicle.id,
        name = roadtrip.name.as_deref().unwrap_or_default(),
        fuel_records = roadtrip.fuel_records.len(),
        "Loaded Road Trip vehicle"
    );

    let report = reconciler
        .sync_vehicle(vehicle.id, &roadtrip.fuel_records)
        .await?;
    Ok(report)
}

fn log_report(report: &SyncReport) {
    if let Some(failure) = &report.insert_failure {
        warn!(
            vehicle_id = report.vehicle_id,
            index = failure.queue_index,
            source_index = failure.source_index,
            not_attempted = report.not_attempted(),
            error = %failure.error,
            "Insert batch stopped; fix the record and re-run to insert the rest"
        );
    }
    if let Some(halt) = &report.classify_halt {
        warn!(
            vehicle_id = report.vehicle_id,
            source_index = ?halt.source_index,
            error = %halt.error,
            "Classification stopped early; later Road Trip fillups were not considered"
        );
    }
    info!(
        vehicle_id = report.vehicle_id,
        source = report.source_records,
        destination = report.destination_records,
        present = report.already_present,
        duplicates = report.duplicates_in_source,
        queued = report.queued,
        inserted = report.inserted,
        "Vehicle synced"
    );
}
