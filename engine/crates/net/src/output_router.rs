use std::collections::HashMap;

use serde::Serialize;
use session::PlayerId;

use crate::channels::{CommandRx, PlayerWriteTx, RegisterRx, UnregisterRx};
use crate::protocol::HostCommand;

/// One output line: the command plus the player it is delivered to.
#[derive(Serialize)]
struct Envelope<'a> {
    to: PlayerId,
    #[serde(flatten)]
    command: &'a HostCommand,
}

fn encode_line(to: PlayerId, command: &HostCommand) -> Option<String> {
    match serde_json::to_string(&Envelope { to, command }) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::error!(player = ?to, error = %e, "Output router: failed to encode command");
            None
        }
    }
}

/// A player's write channel. A player id reconnecting before its old
/// unregistration is processed holds two registrations.
struct Writer {
    tx: PlayerWriteTx,
    registrations: usize,
}

/// Routes HostCommands to the per-player write channel. World-wide commands
/// go to every registered player.
pub async fn run_output_router(
    mut command_rx: CommandRx,
    mut register_rx: RegisterRx,
    mut unregister_rx: UnregisterRx,
) {
    let mut writers: HashMap<PlayerId, Writer> = HashMap::new();

    loop {
        // Polled in order: a registration precedes the player's first
        // commands, an unregistration follows its last ones.
        tokio::select! {
            biased;
            Some(reg) = register_rx.recv() => {
                tracing::debug!(player = ?reg.player, "Output router: player registered");
                writers
                    .entry(reg.player)
                    .and_modify(|w| {
                        w.tx = reg.write_tx.clone();
                        w.registrations += 1;
                    })
                    .or_insert(Writer { tx: reg.write_tx, registrations: 1 });
            }
            Some(command) = command_rx.recv() => {
                let targets: Vec<PlayerId> = match command.recipient() {
                    Some(player) => vec![player],
                    None => writers.keys().copied().collect(),
                };
                for player in targets {
                    let Some(writer) = writers.get(&player) else {
                        continue;
                    };
                    let Some(line) = encode_line(player, &command) else {
                        continue;
                    };
                    if writer.tx.send(line).is_err() {
                        tracing::debug!(player = ?player, "Output router: write channel closed");
                        writers.remove(&player);
                    }
                }
            }
            Some(player) = unregister_rx.recv() => {
                if let Some(writer) = writers.get_mut(&player) {
                    writer.registrations = writer.registrations.saturating_sub(1);
                    if writer.registrations == 0 {
                        tracing::debug!(player = ?player, "Output router: player unregistered");
                        writers.remove(&player);
                    }
                }
            }
            else => break,
        }
    }

    tracing::info!("Output router shutting down");
}
