use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use skyhop_core::{Frame, FrameSink, Intents, SimEvent};
use skyhop_sim::Simulation;
use skyhop_sim::config::SimConfig;

use crate::bot::InputBot;
use crate::config::{BotConfig, HostConfig};

/// Commands sent from the driving shell to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Resize { width: f64, height: f64 },
    Start,
    Reset,
    JumpPressed,
    MoveLeft(bool),
    MoveRight(bool),
    Intents(Intents),
    Stop,
}

/// Output of the session loop, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum HostBroadcast {
    Frame(Frame),
    Event(SimEvent),
    /// The loop has exited. Always the last message.
    SessionEnded,
}

/// Configuration for one simulation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sim: SimConfig,
    pub tick_interval: Duration,
    /// End the session after this many ticks. Zero means no limit.
    pub max_ticks: u64,
    pub auto_restart: bool,
    /// Drive input from a seeded bot when set.
    pub bot: Option<BotConfig>,
}

impl SessionConfig {
    pub fn from_host(host: &HostConfig, sim: SimConfig) -> Self {
        Self {
            sim,
            tick_interval: Duration::from_millis(host.tick_interval_ms.max(1)),
            max_ticks: host.max_ticks,
            auto_restart: host.auto_restart,
            bot: host.bot.enabled.then(|| host.bot.clone()),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_host(
            &HostConfig {
                bot: BotConfig {
                    enabled: false,
                    ..BotConfig::default()
                },
                max_ticks: 0,
                auto_restart: false,
                ..HostConfig::default()
            },
            SimConfig::default(),
        )
    }
}

/// Forwards simulation frames onto the broadcast channel.
struct ChannelSink(mpsc::UnboundedSender<HostBroadcast>);

impl FrameSink for ChannelSink {
    fn present(&mut self, frame: &Frame) {
        let _ = self.0.send(HostBroadcast::Frame(frame.clone()));
    }
}

/// Spawn a simulation session as a tokio task.
/// Returns the command sender and broadcast receiver.
pub fn spawn_session(
    config: SessionConfig,
) -> (
    mpsc::UnboundedSender<HostCommand>,
    mpsc::UnboundedReceiver<HostBroadcast>,
    JoinHandle<()>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (broadcast_tx, broadcast_rx) = mpsc::unbounded_channel();

    let mut sim = Simulation::new(config.sim.clone());
    sim.attach_sink(Box::new(ChannelSink(broadcast_tx.clone())));

    let handle = tokio::spawn(async move {
        run_session_loop(sim, config, cmd_rx, broadcast_tx).await;
    });

    (cmd_tx, broadcast_rx, handle)
}

/// Multiplex commands with the fixed tick clock. The clock is only polled
/// while the simulation is running.
async fn run_session_loop(
    mut sim: Simulation,
    config: SessionConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<HostCommand>,
    broadcast_tx: mpsc::UnboundedSender<HostBroadcast>,
) {
    let mut interval = tokio::time::interval(config.tick_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut bot = config.bot.as_ref().map(InputBot::new);
    let mut total_ticks: u64 = 0;
    let mut games_over: u32 = 0;

    loop {
        let was_running = sim.state().is_running();

        tokio::select! {
            _ = interval.tick(), if was_running => {
                if let Some(bot) = bot.as_mut() {
                    let intents = bot.next_intents(&sim.frame(), sim.arena().width);
                    send_events(&broadcast_tx, sim.apply_intents(&intents));
                }

                let events = sim.tick();
                total_ticks += 1;
                let game_over = events.contains(&SimEvent::GameOver);
                send_events(&broadcast_tx, events);

                if config.max_ticks > 0 && total_ticks >= config.max_ticks {
                    tracing::info!(total_ticks, "Tick limit reached");
                    break;
                }

                if game_over {
                    games_over += 1;
                    if config.auto_restart {
                        tracing::debug!(games_over, "Restarting after game over");
                        send_events(&broadcast_tx, sim.on_reset());
                        send_events(&broadcast_tx, sim.on_start());
                    }
                }
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(HostCommand::Stop) | None => {
                        break;
                    },
                    Some(cmd) => {
                        tracing::trace!(?cmd, "Host command");
                        send_events(&broadcast_tx, apply_command(&mut sim, cmd));
                    },
                }
            }
        }

        // Align the clock with the start of a run so the first tick is a
        // full period after Start.
        if !was_running && sim.state().is_running() {
            interval.reset();
        }
    }

    tracing::info!(total_ticks, games_over, "Session ended");
    let _ = broadcast_tx.send(HostBroadcast::SessionEnded);
}

fn apply_command(sim: &mut Simulation, cmd: HostCommand) -> Vec<SimEvent> {
    match cmd {
        HostCommand::Resize { width, height } => sim.on_resize(width, height),
        HostCommand::Start => sim.on_start(),
        HostCommand::Reset => sim.on_reset(),
        HostCommand::JumpPressed => sim.on_jump_pressed(),
        HostCommand::MoveLeft(held) => {
            sim.on_move_left(held);
            Vec::new()
        },
        HostCommand::MoveRight(held) => {
            sim.on_move_right(held);
            Vec::new()
        },
        HostCommand::Intents(intents) => sim.apply_intents(&intents),
        HostCommand::Stop => Vec::new(),
    }
}

fn send_events(tx: &mpsc::UnboundedSender<HostBroadcast>, events: Vec<SimEvent>) {
    for event in events {
        let _ = tx.send(HostBroadcast::Event(event));
    }
}
