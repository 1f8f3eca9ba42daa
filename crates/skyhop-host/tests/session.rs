use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use skyhop_core::{GameState, SimEvent};
use skyhop_host::config::BotConfig;
use skyhop_host::game_loop::{HostBroadcast, HostCommand, SessionConfig, spawn_session};
use skyhop_sim::config::{PhysicsConfig, SimConfig};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn next(rx: &mut UnboundedReceiver<HostBroadcast>) -> HostBroadcast {
    tokio::time::timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for broadcast")
        .expect("broadcast channel closed")
}

/// Drain until the session ends, returning everything seen.
async fn drain(rx: &mut UnboundedReceiver<HostBroadcast>) -> Vec<HostBroadcast> {
    let mut out = Vec::new();
    loop {
        let msg = next(rx).await;
        if msg == HostBroadcast::SessionEnded {
            return out;
        }
        out.push(msg);
    }
}

fn events(msgs: &[HostBroadcast]) -> Vec<SimEvent> {
    msgs.iter()
        .filter_map(|m| match m {
            HostBroadcast::Event(e) => Some(*e),
            _ => None,
        })
        .collect()
}

fn resize() -> HostCommand {
    HostCommand::Resize {
        width: 400.0,
        height: 800.0,
    }
}

#[tokio::test(start_paused = true)]
async fn first_resize_emits_frame_then_reset() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::default());
    cmd_tx.send(resize()).unwrap();

    match next(&mut rx).await {
        HostBroadcast::Frame(frame) => {
            assert_eq!(frame.tick, 0);
            assert_eq!(frame.state, GameState::Idle);
            assert_eq!(frame.platforms.len(), 3);
            assert_eq!(frame.player.bottom(), frame.platforms[0].top());
        },
        other => panic!("Expected reset frame, got: {other:?}"),
    }
    assert_eq!(next(&mut rx).await, HostBroadcast::Event(SimEvent::Reset));

    cmd_tx.send(HostCommand::Stop).unwrap();
    assert_eq!(next(&mut rx).await, HostBroadcast::SessionEnded);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn idle_session_does_not_tick() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::default());
    cmd_tx.send(resize()).unwrap();
    let _ = next(&mut rx).await;
    let _ = next(&mut rx).await;

    let quiet = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(quiet.is_err(), "no frames expected before Start");

    cmd_tx.send(HostCommand::Stop).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn start_produces_sequential_frames() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::default());
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();
    let _ = next(&mut rx).await;
    assert_eq!(next(&mut rx).await, HostBroadcast::Event(SimEvent::Reset));
    assert_eq!(next(&mut rx).await, HostBroadcast::Event(SimEvent::Started));

    let before = tokio::time::Instant::now();
    for expected in 1..=5u64 {
        match next(&mut rx).await {
            HostBroadcast::Frame(frame) => {
                assert_eq!(frame.tick, expected);
                assert_eq!(frame.state, GameState::Running);
                assert!(frame.grounded);
            },
            other => panic!("Expected tick frame, got: {other:?}"),
        }
    }
    // Five ticks at 16 ms, the first one a full period after Start.
    assert!(before.elapsed() >= Duration::from_millis(80));

    cmd_tx.send(HostCommand::Stop).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn jump_command_launches_player() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::default());
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();
    cmd_tx.send(HostCommand::JumpPressed).unwrap();

    let mut start_y = None;
    let mut jumps = 0;
    let mut airborne_frames = 0;
    while airborne_frames < 3 {
        match next(&mut rx).await {
            HostBroadcast::Frame(frame) if frame.tick == 0 => start_y = Some(frame.player.y),
            HostBroadcast::Frame(frame) => {
                assert!(!frame.grounded);
                assert!(frame.player.y < start_y.unwrap());
                airborne_frames += 1;
                cmd_tx.send(HostCommand::JumpPressed).unwrap();
            },
            HostBroadcast::Event(SimEvent::Jumped) => jumps += 1,
            _ => {},
        }
    }
    assert_eq!(jumps, 1, "second press while airborne is ignored");

    cmd_tx.send(HostCommand::Stop).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_stops_ticking() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::default());
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();
    cmd_tx.send(HostCommand::MoveRight(true)).unwrap();

    loop {
        if let HostBroadcast::Frame(frame) = next(&mut rx).await
            && frame.tick == 3
        {
            break;
        }
    }
    cmd_tx.send(HostCommand::Reset).unwrap();
    match next(&mut rx).await {
        HostBroadcast::Frame(frame) => {
            assert_eq!(frame.tick, 0);
            assert_eq!(frame.state, GameState::Idle);
        },
        other => panic!("Expected reset frame, got: {other:?}"),
    }
    assert_eq!(next(&mut rx).await, HostBroadcast::Event(SimEvent::Reset));
    let quiet = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(quiet.is_err(), "reset must stop the clock");

    cmd_tx.send(HostCommand::Stop).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn max_ticks_ends_session() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig {
        max_ticks: 10,
        ..SessionConfig::default()
    });
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();

    let msgs = drain(&mut rx).await;
    let ticks: Vec<u64> = msgs
        .iter()
        .filter_map(|m| match m {
            HostBroadcast::Frame(f) if f.tick > 0 => Some(f.tick),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, (1..=10).collect::<Vec<_>>());
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn dropped_sender_ends_session() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::default());
    drop(cmd_tx);
    assert_eq!(next(&mut rx).await, HostBroadcast::SessionEnded);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn open_floor_game_over_auto_restarts() {
    let sim = SimConfig {
        physics: PhysicsConfig {
            solid_floor: false,
            ..PhysicsConfig::default()
        },
        platforms: vec![],
        ..SimConfig::default()
    };
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig {
        sim,
        max_ticks: 40,
        auto_restart: true,
        ..SessionConfig::default()
    });
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();

    let msgs = drain(&mut rx).await;
    let evs = events(&msgs);
    let over = evs
        .iter()
        .position(|e| *e == SimEvent::GameOver)
        .expect("player should fall out of an open arena");
    assert_eq!(
        &evs[over..over + 3],
        &[SimEvent::GameOver, SimEvent::Reset, SimEvent::Started]
    );
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn game_over_without_restart_waits_for_reset() {
    let sim = SimConfig {
        physics: PhysicsConfig {
            solid_floor: false,
            ..PhysicsConfig::default()
        },
        platforms: vec![],
        ..SimConfig::default()
    };
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig {
        sim,
        ..SessionConfig::default()
    });
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();

    loop {
        if next(&mut rx).await == HostBroadcast::Event(SimEvent::GameOver) {
            break;
        }
    }
    cmd_tx.send(HostCommand::Start).unwrap();
    let quiet = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(quiet.is_err(), "Start is ignored after game over");

    cmd_tx.send(HostCommand::Reset).unwrap();
    let _ = next(&mut rx).await;
    assert_eq!(next(&mut rx).await, HostBroadcast::Event(SimEvent::Reset));

    cmd_tx.send(HostCommand::Stop).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn bot_drives_jumps() {
    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig {
        bot: Some(BotConfig {
            jump_chance: 1.0,
            ..BotConfig::default()
        }),
        max_ticks: 60,
        ..SessionConfig::default()
    });
    cmd_tx.send(resize()).unwrap();
    cmd_tx.send(HostCommand::Start).unwrap();

    let msgs = drain(&mut rx).await;
    let evs = events(&msgs);
    assert!(evs.contains(&SimEvent::Jumped));
    handle.await.unwrap();
}
