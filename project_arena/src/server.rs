//! The event/tick loop and its output plumbing.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinError;

use arena::ArenaCore;
use net::channels::{EventRx, PlayerWriteRx, PlayerWriteTx, RegisterPlayer, RegisterTx, UnregisterTx};
use net::output_router::run_output_router;
use net::{ChannelHost, HostEvent};
use observability::TickMetrics;

use crate::bridge;
use crate::shutdown::ShutdownRx;

/// UTC unix milliseconds.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Run the arena until the event stream closes or shutdown is signaled, then
/// return every occupant to the lobby and wait until all output, including
/// those restores, has been written to `out`.
pub async fn serve<W>(
    core: ArenaCore,
    event_rx: EventRx,
    out: W,
    tick_interval: Duration,
    shutdown_rx: ShutdownRx,
) -> Result<W, JoinError>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (register_tx, register_rx) = mpsc::unbounded_channel();
    let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
    let (line_tx, line_rx) = mpsc::unbounded_channel();

    let router = tokio::spawn(run_output_router(command_rx, register_rx, unregister_rx));
    let writer = tokio::spawn(write_lines(line_rx, out));

    let host = ChannelHost::new(command_tx);
    let links = Links {
        register_tx,
        unregister_tx,
        line_tx,
    };
    // Consumes the host and links; their senders close the router's inputs.
    run_event_loop(core, host, event_rx, links, tick_interval, shutdown_rx).await;

    if let Err(e) = router.await {
        tracing::error!(error = %e, "Output router task failed");
    }
    writer.await
}

/// Output plumbing for connecting and disconnecting players.
struct Links {
    register_tx: RegisterTx,
    unregister_tx: UnregisterTx,
    /// Every player's lines go to the one writer.
    line_tx: PlayerWriteTx,
}

/// All host events and world ticks run here, one at a time.
async fn run_event_loop(
    mut core: ArenaCore,
    mut host: ChannelHost,
    mut event_rx: EventRx,
    links: Links,
    tick_interval: Duration,
    mut shutdown_rx: ShutdownRx,
) {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut metrics = TickMetrics::with_budget(tick_interval);

    loop {
        tokio::select! {
            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else {
                    tracing::info!("Host event stream closed");
                    break;
                };
                let disconnected = match &event {
                    HostEvent::Connect { player, .. } => {
                        let _ = links.register_tx.send(RegisterPlayer {
                            player: *player,
                            write_tx: links.line_tx.clone(),
                        });
                        None
                    }
                    HostEvent::Disconnect { player } => Some(*player),
                    _ => None,
                };
                bridge::dispatch(&mut core, &mut host, event, now_ms());
                metrics.event_count += 1;
                // Unregister after the restore commands are queued.
                if let Some(player) = disconnected {
                    let _ = links.unregister_tx.send(player);
                }
            }
            _ = ticker.tick() => {
                let start = Instant::now();
                metrics.tick_number += 1;
                metrics.rewards_paid = core.on_world_tick(&mut host, now_ms());
                metrics.occupant_count = core.sessions().in_space_count();
                metrics.duration_us = start.elapsed().as_micros();
                metrics.log();
                metrics.event_count = 0;
            }
            _ = shutdown_rx.wait() => {
                tracing::info!("Arena event loop: shutdown signal received");
                break;
            }
        }
    }

    // Hand lobby inventories back before the host saves players.
    let occupants = core.sessions().in_space();
    for player in occupants {
        if let Err(e) = core.leave(&mut host, player) {
            tracing::warn!(player = ?player, error = %e, "leave on shutdown failed");
        }
    }
    tracing::info!(tick = metrics.tick_number, "Arena event loop stopped");
}

/// Write each line plus a newline, flushing after every line. Returns the
/// writer once every sender is gone or a write fails.
async fn write_lines<W>(mut line_rx: PlayerWriteRx, mut out: W) -> W
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = line_rx.recv().await {
        line.push('\n');
        if let Err(e) = out.write_all(line.as_bytes()).await {
            tracing::error!(error = %e, "output write failed");
            break;
        }
        if let Err(e) = out.flush().await {
            tracing::error!(error = %e, "output flush failed");
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_lines_appends_newlines() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("a".to_string()).unwrap();
        tx.send("b".to_string()).unwrap();
        drop(tx);
        let out = write_lines(rx, Vec::new()).await;
        assert_eq!(out, b"a\nb\n");
    }
}
