use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use arena::ArenaCore;
use net::channels::EventTx;
use net::HostEvent;
use persistence::SqliteStore;
use project_arena::config::{parse_cli_args, ServerConfig};
use project_arena::server;
use project_arena::shutdown::{self, shutdown_channel, ShutdownRx};

#[tokio::main]
async fn main() {
    observability::init_logging();

    let config = parse_cli_args();
    tracing::info!("Arena server starting...");

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let mut server = tokio::spawn(run_arena_server(config, shutdown_rx));

    tokio::select! {
        _ = shutdown::wait_for_signal() => {
            tracing::info!("Shutdown signal received, stopping server...");
            shutdown_tx.trigger();
            if tokio::time::timeout(Duration::from_secs(5), &mut server).await.is_err() {
                tracing::warn!("Server did not stop in time");
            }
        }
        result = &mut server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server task failed");
            }
        }
    }

    tracing::info!("Server stopped.");
}

async fn run_arena_server(config: ServerConfig, shutdown_rx: ShutdownRx) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_stdin(event_tx, shutdown_rx.clone()));

    let mut core = ArenaCore::new(Box::new(config.catalog()), config.arena_settings());
    if config.store.enabled {
        match SqliteStore::open(&config.store.path) {
            Ok(store) => {
                tracing::info!(path = %config.store.path, "Arena store opened");
                core.attach_store(Box::new(store));
            }
            Err(e) => {
                tracing::error!(path = %config.store.path, error = %e, "Arena store unavailable, running in memory");
            }
        }
    } else {
        tracing::info!("Store disabled, running in memory");
    }

    let served = server::serve(
        core,
        event_rx,
        tokio::io::stdout(),
        config.tick_interval(),
        shutdown_rx,
    )
    .await;
    if let Err(e) = served {
        tracing::error!(error = %e, "stdout writer task failed");
    }
}

/// One JSON `HostEvent` per line. Malformed lines are logged and skipped.
async fn read_stdin(event_tx: EventTx, mut shutdown_rx: ShutdownRx) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<HostEvent>(line) {
                        Ok(event) => {
                            if event_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Ignoring malformed host event"),
                    }
                }
                Ok(None) => {
                    tracing::info!("stdin closed");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "stdin read failed");
                    break;
                }
            },
            _ = shutdown_rx.wait() => break,
        }
    }
}
