use tracing_subscriber::EnvFilter;

use skyhop_core::SimEvent;
use skyhop_host::config::HostConfig;
use skyhop_host::game_loop::{HostBroadcast, HostCommand, SessionConfig, spawn_session};
use skyhop_sim::config::SimConfig;

#[tokio::main]
async fn main() {
    // Logs go to stderr so the frame log owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = HostConfig::load();
    let sim_config = SimConfig::load();

    tracing::info!(
        width = config.arena_width,
        height = config.arena_height,
        tick_ms = config.tick_interval_ms,
        platforms = sim_config.platforms.len(),
        bot = config.bot.enabled,
        "Skyhop host starting"
    );

    let (cmd_tx, mut rx, handle) = spawn_session(SessionConfig::from_host(&config, sim_config));
    let _ = cmd_tx.send(HostCommand::Resize {
        width: config.arena_width,
        height: config.arena_height,
    });
    let _ = cmd_tx.send(HostCommand::Start);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;
    let mut frames: u64 = 0;
    let mut jumps: u64 = 0;

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(HostBroadcast::Frame(frame)) => {
                    frames += 1;
                    if config.frame_log {
                        match serde_json::to_string(&frame) {
                            Ok(line) => println!("{line}"),
                            Err(e) => tracing::error!(tick = frame.tick, error = %e, "Failed to encode frame"),
                        }
                    }
                },
                Some(HostBroadcast::Event(event)) => {
                    if event == SimEvent::Jumped {
                        jumps += 1;
                    }
                    tracing::debug!(?event, "Simulation event");
                },
                Some(HostBroadcast::SessionEnded) | None => break,
            },
            _ = &mut ctrl_c, if !stopping => {
                tracing::info!("Interrupted, stopping session");
                stopping = true;
                let _ = cmd_tx.send(HostCommand::Stop);
            }
        }
    }

    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Session task failed");
    }
    tracing::info!(frames, jumps, "Skyhop host exiting");
}
