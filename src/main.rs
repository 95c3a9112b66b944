//! Draw Sheet Tracker
//!
//! Performs exactly one reconciliation run and exits. Meant to be triggered
//! by cron or a CI schedule; runs must not overlap.
//!
//! Usage:
//!   drawsheet [--config drawsheet.toml] [--data-dir data] [--dry-run]
//!
//! Environment Variables:
//!   DRAWSHEET_CONFIG - Path to TOML config file
//!   DRAWSHEET_DATA_DIR - Directory holding state/latest/history JSON
//!   DRAWSHEET_UTC_OFFSET_MINUTES - Local calendar offset (default: -420)
//!   DRAWSHEET_PROBE_TIMEOUT_SECS - Per-request probe timeout (default: 12)
//!   DRAWSHEET_HISTORY_LIMIT - Keep only the N most recent history entries
//!   RUST_LOG - Log filter (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drawsheet_tracker::{AppConfig, HttpProber, JsonFileStore, Reconciler, SystemClock};

#[derive(Parser, Debug)]
#[command(name = "drawsheet")]
#[command(about = "Advance draw-result sheet counters once the next sheet is published")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "DRAWSHEET_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding state.json, latest.json and history.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Probe and report, but do not write any file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    init_tracing();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            let mut config = AppConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            config.apply_env_overrides();
            config
        }
        None => AppConfig::from_env(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    for gap in config.gaps() {
        warn!("{}", gap);
    }

    let prober = HttpProber::new(&config.probe).context("building HTTP client")?;
    let store = JsonFileStore::new(&config.data_dir);
    info!(
        data_dir = %store.dir().display(),
        series = config.series.len(),
        "starting reconciliation run"
    );

    let reconciler = Reconciler::new(
        &config,
        Arc::new(prober),
        Arc::new(store),
        Arc::new(SystemClock),
    )
    .context("invalid configuration")?
    .with_dry_run(args.dry_run);

    let report = reconciler.run().await.context("reconciliation run failed")?;
    debug!(?report, "run report");

    if report.persisted {
        info!(advanced = report.advanced, "views updated in {}", config.data_dir.display());
    } else if report.dry_run && report.advanced > 0 {
        info!(advanced = report.advanced, "dry run: views would have been updated");
    } else {
        info!("no changes; views left untouched");
    }

    Ok(())
}

/// Human-readable progress lines on stdout
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drawsheet_tracker=info,drawsheet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
