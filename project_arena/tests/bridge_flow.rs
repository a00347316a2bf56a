/// JSON host events in, JSON lines out: the bridge feeding the output router.
mod common;

use std::time::Duration;

use arena::ArenaCore;
use net::channels::RegisterPlayer;
use net::{ChannelHost, HostEvent};
use project_arena::bridge::dispatch;
use serde_json::Value;
use session::PlayerId;
use tokio::sync::mpsc;

fn event(json: &str) -> HostEvent {
    serde_json::from_str(json).unwrap()
}

fn script(core: &mut ArenaCore, host: &mut ChannelHost, lines: &[&str]) {
    for line in lines {
        dispatch(core, host, event(line), 0);
    }
}

async fn collect(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(Some(line)) = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
        out.push(serde_json::from_str(&line).unwrap());
    }
    out
}

#[tokio::test]
async fn admin_setup_then_join_reaches_the_right_writers() {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (register_tx, register_rx) = mpsc::unbounded_channel();
    let (_unregister_tx, unregister_rx) = mpsc::unbounded_channel();
    tokio::spawn(net::output_router::run_output_router(command_rx, register_rx, unregister_rx));

    let (admin_tx, mut admin_rx) = mpsc::unbounded_channel();
    let (guest_tx, mut guest_rx) = mpsc::unbounded_channel();
    register_tx
        .send(RegisterPlayer { player: PlayerId(1), write_tx: admin_tx })
        .unwrap();
    register_tx
        .send(RegisterPlayer { player: PlayerId(2), write_tx: guest_tx })
        .unwrap();

    let mut core = common::empty_core(5);
    let mut host = ChannelHost::new(command_tx);
    script(
        &mut core,
        &mut host,
        &[
            r#"{"type":"connect","player":1,"name":"Admin","position":{"x":40,"y":50}}"#,
            r#"{"type":"connect","player":2,"name":"Guest"}"#,
            r#"{"type":"admin","player":1,"command":{"op":"create_space","name":"Arena"}}"#,
            r#"{"type":"admin","player":1,"command":{"op":"create_template","name":"kit"}}"#,
            r#"{"type":"admin","player":1,"command":{"op":"set_template_item","name":"kit","slot":"items0","item_id":100}}"#,
            r#"{"type":"admin","player":1,"command":{"op":"add_template","space":"Arena","template":"kit"}}"#,
            r#"{"type":"admin","player":1,"command":{"op":"set_override","space":"Arena","item_id":100,"param":"damage","value":"2"}}"#,
            r#"{"type":"join","player":2,"space":"arena"}"#,
        ],
    );

    let admin = collect(&mut admin_rx).await;
    assert!(admin.iter().all(|v| v["to"] == 1));
    assert!(admin
        .iter()
        .any(|v| v["type"] == "message" && v["text"] == "Space 'Arena' created with spawn [40, 50]."));

    let guest = collect(&mut guest_rx).await;
    assert!(guest.iter().all(|v| v["to"] == 2));
    let slot = guest
        .iter()
        .position(|v| v["type"] == "slot" && v["slot"] == 0 && v["item_id"] == 100)
        .unwrap();
    assert_eq!(guest[slot + 1]["type"], "raw");
    let spawn = core.space("Arena").unwrap().random_spawn.unwrap().pos;
    assert!(guest
        .iter()
        .any(|v| v["type"] == "teleport" && v["x"] == spawn.x && v["y"] == spawn.y));
    assert!(guest
        .iter()
        .any(|v| v["type"] == "message" && v["text"] == "Welcome to space 'Arena'!"));
}

#[tokio::test]
async fn disconnect_restores_before_unregistering() {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (register_tx, register_rx) = mpsc::unbounded_channel();
    let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
    tokio::spawn(net::output_router::run_output_router(command_rx, register_rx, unregister_rx));

    let (line_tx, mut line_rx) = mpsc::unbounded_channel();
    register_tx
        .send(RegisterPlayer { player: PlayerId(3), write_tx: line_tx })
        .unwrap();

    let mut core = common::murder_core(1);
    let mut host = ChannelHost::new(command_tx);
    script(
        &mut core,
        &mut host,
        &[
            r#"{"type":"connect","player":3,"name":"Cy","hostile":false,
                "inventory":{"items":[{"item_id":555,"stack":1,"prefix":0}]}}"#,
            r#"{"type":"join","player":3,"space":"Arena"}"#,
            r#"{"type":"disconnect","player":3}"#,
        ],
    );
    unregister_tx.send(PlayerId(3)).unwrap();

    let lines = collect(&mut line_rx).await;
    let last_slot0 = lines
        .iter()
        .rev()
        .find(|v| v["type"] == "slot" && v["slot"] == 0)
        .unwrap();
    assert_eq!(last_slot0["item_id"], 555);
    let last_pvp = lines.iter().rev().find(|v| v["type"] == "pvp").unwrap();
    assert_eq!(last_pvp["hostile"], false);
    assert!(core.session(PlayerId(3)).is_none());
}

#[test]
fn rejected_requests_come_back_as_errors() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut core = common::murder_core(1);
    let mut host = ChannelHost::new(tx);
    script(
        &mut core,
        &mut host,
        &[
            r#"{"type":"connect","player":1,"name":"A"}"#,
            r#"{"type":"leave","player":1}"#,
            r#"{"type":"admin","player":1,"command":{"op":"set_capacity","space":"Arena","capacity":0}}"#,
            r#"{"type":"pick","player":1,"template":"innocent"}"#,
        ],
    );
    let errors: Vec<_> = common::drain(&mut rx)
        .into_iter()
        .filter_map(|c| match c {
            net::HostCommand::Message { tone: net::Tone::Error, text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 3);
    assert_eq!(core.space("Arena").unwrap().capacity, 2);
}
