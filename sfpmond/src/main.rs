//! sfpmon daemon
//!
//! Watches the presence registers of a switch board and reports transceiver
//! insertions and removals.
//!
//! The board is chosen with `--board` or the `[board]` section of the config
//! file. Events are always logged; `--json` also writes them to stdout as
//! JSON lines. `--mock` runs against simulated registers with every port
//! empty.

mod config;
mod consumer;
mod events;
mod source;

use anyhow::Result;
use clap::Parser;
use config::{Overrides, Settings};
use consumer::ChangeEventConsumer;
use events::{EventSink, JsonLinesSink, LogSink};
use sfpmon_core::{default_config_path, BoardType};
use sfpmon_hardware::{MonitorTiming, TransceiverMonitor};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// Transceiver presence monitor
#[derive(Parser, Debug)]
#[command(name = "sfpmond")]
#[command(version, about = "Transceiver presence monitoring daemon", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run against simulated registers instead of hardware
    #[arg(long)]
    mock: bool,

    /// Board preset (qsfp32-sfp2, qsfp36, osfp64, osfp64-sfp2, custom)
    ///
    /// Overrides the board configured in the config file. "custom" uses the
    /// `[board.layout]` table from the config file.
    #[arg(long)]
    board: Option<BoardType>,

    /// Directory holding the CPLD register files
    #[arg(long)]
    root: Option<PathBuf>,

    /// Also write events to stdout as JSON lines
    #[arg(long)]
    json: bool,

    /// Wait per check in milliseconds (0 waits until a change)
    #[arg(long, allow_negative_numbers = true)]
    timeout_ms: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("sfpmon daemon starting...");

    // Config path: CLI flag > env var > default
    let config_path = args.config.clone().unwrap_or_else(|| {
        std::env::var("SFPMON_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path())
    });
    info!("Configuration file: {}", config_path.display());

    let overrides = Overrides {
        board: args.board,
        root: args.root.clone(),
        check_timeout_ms: args.timeout_ms,
        json: args.json,
        mock: args.mock,
    };

    let settings = match Settings::load(&config_path, &overrides) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Board: {} ({} ports), registers under {}",
        settings.layout.name,
        settings.layout.port_count,
        settings.registers.root.display()
    );

    let source = source::build(&settings);
    let timing = MonitorTiming::from(&settings.monitor);
    let monitor = TransceiverMonitor::with_timing(settings.layout.clone(), source, timing)?;

    let mut sinks: Vec<Box<dyn EventSink>> = vec![Box::new(LogSink)];
    if settings.json_events {
        sinks.push(Box::new(JsonLinesSink::stdout()));
    }

    let mut consumer = ChangeEventConsumer::new(
        monitor,
        sinks,
        settings.retry.clone(),
        settings.monitor.check_timeout_ms,
    );

    tokio::select! {
        result = consumer.run() => {
            if let Err(e) = result {
                error!("Monitor stopped: {:#}", e);
                return Err(e);
            }
        }
        _ = shutdown_signal() => {}
    }

    info!("sfpmon daemon shutdown complete");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so JSON events on stdout stay machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
