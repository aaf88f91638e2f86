//! `servicerun` binary.
//!
//! Serves the configured HTTP listeners (and the metrics endpoint when
//! enabled) until one of the configured signals arrives, then shuts them down
//! gracefully.
//!
//! ```text
//! servicerun --config servicerun.toml --signal SIGTERM --shutdown-timeout 10
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use servicerun::config::{load_config, SupervisorConfig};
use servicerun::http::service_router;
use servicerun::observability::{logging, metrics};
use servicerun::{close_fn, Options, Registration, Signal};

#[derive(Parser)]
#[command(name = "servicerun")]
#[command(about = "Run HTTP listeners until a termination signal, then shut down gracefully", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signal that triggers the shutdown (repeatable, overrides the config).
    #[arg(short, long = "signal")]
    signals: Vec<Signal>,

    /// Grace period for each listener during shutdown, in seconds.
    #[arg(long)]
    shutdown_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("servicerun: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => SupervisorConfig::default(),
    };
    if !cli.signals.is_empty() {
        config.signals = cli.signals;
    }
    if cli.shutdown_timeout.is_some() {
        config.shutdown_timeout_secs = cli.shutdown_timeout;
    }

    logging::init_tracing(&config.observability.log_level);
    tracing::info!(
        listeners = config.listeners.len(),
        signals = ?config.signals,
        shutdown_timeout_secs = ?config.shutdown_timeout_secs,
        "servicerun v0.1.0 starting"
    );

    match servicerun::run(Options::from_config(&config), registrations(&config)).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Shutdown with error");
            ExitCode::FAILURE
        }
    }
}

fn registrations(config: &SupervisorConfig) -> Vec<Registration> {
    let mut registrations: Vec<Registration> = config
        .listeners
        .iter()
        .map(|listener| {
            let router = service_router(listener.name.clone());
            match &listener.tls {
                Some(tls) => Registration::http_handler_tls(
                    listener.bind_address.clone(),
                    &tls.cert_path,
                    &tls.key_path,
                    router,
                ),
                None => Registration::http_handler(listener.bind_address.clone(), router),
            }
        })
        .collect();

    let observability = &config.observability;
    if observability.metrics_enabled {
        match metrics::install_exporter() {
            Ok(handle) => {
                let snapshot = handle.clone();
                registrations.push(Registration::http_handler(
                    observability.metrics_address.clone(),
                    metrics::router(handle),
                ));
                registrations.push(Registration::closer_before(
                    "metrics snapshot",
                    Arc::new(close_fn(move || {
                        let rendered = snapshot.render();
                        async move {
                            tracing::info!(metrics = %rendered, "Final metrics snapshot");
                            Ok(())
                        }
                    })),
                ));
            }
            Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
        }
    }

    registrations
}
