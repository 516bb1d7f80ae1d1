//! Async driver: owns a `GameSession` on a tokio task, serializes commands
//! through an mpsc channel and streams drained events to the caller.
//!
//! AI turns are delayed by the tier's thinking time plus one wave delay per
//! resolved wave, so the opponent never moves while the last chain reaction is
//! still animating. Delayed continuations carry an `AiTicket`; the session drops
//! tickets that outlived a reset or another move.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::engine::error::EngineError;
use crate::engine::models::{AiTicket, GameEvent, Pos, SessionConfig};
use crate::engine::session::{GameSession, SessionView};

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Presentation delay per chain-reaction wave.
    pub wave_delay: Duration,
    pub command_buffer: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            wave_delay: Duration::from_millis(250),
            command_buffer: 32,
        }
    }
}

enum Command {
    Increment { pos: Pos, reply: oneshot::Sender<bool> },
    Undo { reply: oneshot::Sender<bool> },
    Pause { reply: oneshot::Sender<bool> },
    Resume { reply: oneshot::Sender<bool> },
    Reset {
        config: SessionConfig,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    View { reply: oneshot::Sender<SessionView> },
    Shutdown,
}

/// Cloneable front end to a running driver.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).await.map_err(|_| EngineError::DriverClosed)?;
        rx.await.map_err(|_| EngineError::DriverClosed)
    }

    pub async fn increment(&self, pos: Pos) -> Result<bool, EngineError> {
        self.request(|reply| Command::Increment { pos, reply }).await
    }

    pub async fn undo(&self) -> Result<bool, EngineError> {
        self.request(|reply| Command::Undo { reply }).await
    }

    pub async fn pause(&self) -> Result<bool, EngineError> {
        self.request(|reply| Command::Pause { reply }).await
    }

    pub async fn resume(&self) -> Result<bool, EngineError> {
        self.request(|reply| Command::Resume { reply }).await
    }

    pub async fn reset(&self, config: SessionConfig) -> Result<(), EngineError> {
        self.request(|reply| Command::Reset { config, reply }).await?
    }

    pub async fn view(&self) -> Result<SessionView, EngineError> {
        self.request(|reply| Command::View { reply }).await
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }
}

/// Spawn the driver task. The join handle yields the session back on shutdown.
pub fn spawn(
    session: GameSession,
    config: DriverConfig,
) -> (SessionHandle, UnboundedReceiverStream<GameEvent>, JoinHandle<GameSession>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer.max(1));
    // Unbounded so a slow consumer that issues commands can never stall the driver.
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(session, config, cmd_rx, event_tx));
    (SessionHandle { tx: cmd_tx }, UnboundedReceiverStream::new(event_rx), task)
}

async fn run(
    mut session: GameSession,
    config: DriverConfig,
    mut cmd_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::UnboundedSender<GameEvent>,
) -> GameSession {
    let (ai_tx, mut ai_rx) = mpsc::channel::<AiTicket>(8);
    let mut scheduled: Option<AiTicket> = None;

    loop {
        let waves = forward_events(&mut session, &event_tx);

        if let Some(ticket) = session.pending_ai_turn() {
            if scheduled != Some(ticket) {
                scheduled = Some(ticket);
                let delay = session.thinking_time() + config.wave_delay * waves as u32;
                tracing::debug!(player = %ticket.player, delay_ms = delay.as_millis() as u64, "scheduling ai turn");
                let ai_tx = ai_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = ai_tx.send(ticket).await;
                });
            }
        }

        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                None | Some(Command::Shutdown) => break,
                Some(cmd) => handle(&mut session, cmd),
            },
            Some(ticket) = ai_rx.recv() => {
                session.run_ai_turn(ticket);
            }
        }
    }

    forward_events(&mut session, &event_tx);
    tracing::info!(generation = session.generation(), "session driver stopped");
    session
}

fn handle(session: &mut GameSession, cmd: Command) {
    // A dropped reply receiver only means the caller stopped waiting.
    match cmd {
        Command::Increment { pos, reply } => {
            let _ = reply.send(session.increment(pos));
        }
        Command::Undo { reply } => {
            let _ = reply.send(session.undo());
        }
        Command::Pause { reply } => {
            let _ = reply.send(session.pause());
        }
        Command::Resume { reply } => {
            let _ = reply.send(session.resume());
        }
        Command::Reset { config, reply } => {
            let _ = reply.send(session.reset(config));
        }
        Command::View { reply } => {
            let _ = reply.send(session.view());
        }
        Command::Shutdown => {}
    }
}

/// Push drained events downstream. Returns how many waves were sent.
fn forward_events(session: &mut GameSession, event_tx: &mpsc::UnboundedSender<GameEvent>) -> usize {
    let mut waves = 0;
    for event in session.drain_events() {
        if matches!(event, GameEvent::WaveResolved { .. }) {
            waves += 1;
        }
        // Nobody listening is fine; the game keeps running.
        let _ = event_tx.send(event);
    }
    waves
}
