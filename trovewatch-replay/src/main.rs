//! Trovewatch Replay
//!
//! Replays a scripted sequence of ledger events against an in-memory ledger
//! and prints every state the configured watches deliver, one JSON object
//! per line.

mod config;
mod output;
mod script;
mod shutdown;
mod watches;

use clap::Parser;
use config::ConfigLoader;
use script::ScriptRunner;
use shutdown::shutdown_signal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use trovewatch_core::watch::{LedgerObserver, WatchError, WatchSet};
use trovewatch_sdk::memory::MemoryLedger;

/// Trovewatch Replay - debounced ledger watches over a scripted ledger
#[derive(Parser, Debug)]
#[command(name = "trovewatch-replay")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the replay file
    #[arg(short, long, default_value = "./trovewatch-replay.toml")]
    config: PathBuf,

    /// Override the debounce window in milliseconds
    #[arg(long, env = "TROVEWATCH_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Override how long to keep watching after the last step, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting trovewatch-replay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.debounce_ms, args.settle_ms);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let ledger = Arc::new(MemoryLedger::new(config.contracts.clone()));
    ledger.set_price(0, config.initial_price);

    let mut observer =
        LedgerObserver::new(ledger.clone(), config.contracts.clone(), config.observer);
    observer.set_user_address(config.user_address.clone());

    // Register watches
    let mut watch_set = WatchSet::new();
    for entry in &config.watches {
        match watches::register(&observer, entry) {
            Ok(handle) => watch_set.push(handle),
            Err(WatchError::NotImplemented(name)) => {
                tracing::warn!("Skipping {}: not implemented", name);
            }
            Err(e) => {
                tracing::error!("Failed to register {:?} watch: {}", entry.kind, e);
                return Err(e.into());
            }
        }
    }
    tracing::info!("{} watches registered", watch_set.len());

    // Run the script until it finishes or we are interrupted
    let runner = ScriptRunner::new(ledger.clone(), config.script);
    tokio::select! {
        _ = runner.run(config.settle) => {
            tracing::info!("Script finished");
        }
        _ = shutdown_signal() => {}
    }

    // Tear down every watch
    watch_set.dispose().map_err(|e| {
        tracing::error!("Failed to dispose watches: {}", e);
        e
    })?;
    tracing::info!("Replay complete, {} listeners left", ledger.listener_count());

    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so stdout carries only state updates.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
