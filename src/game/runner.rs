//! Game runner: owns the engine and its timers on a single task

use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::leaderboard::entry::validate_name;
use crate::leaderboard::{qualifies, LeaderboardClient, LeaderboardEntry};
use crate::util::time::frame_duration;

use super::engine::Engine;
use super::events::GameEvent;

/// Ranked places checked when a session ends
const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Commands accepted by the runner
#[derive(Debug, Clone)]
pub enum RunnerCommand {
    /// Start (or restart) a session
    Start,
    /// Current contents of the input box
    Input(String),
    /// End the running session
    Stop,
    /// Submit the last final score under `name`
    SaveScore { name: String },
}

/// Leaderboard verdict for a finished session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub final_score: u32,
    /// Whether the score earns a place (offer to save it)
    pub qualifies: bool,
    /// Current top list (empty if it could not be fetched)
    pub top: Vec<LeaderboardEntry>,
    /// Set when the leaderboard could not be reached
    pub leaderboard_error: Option<String>,
}

/// Events published by the runner
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    Game(GameEvent),
    Outcome(SessionOutcome),
    ScoreSaved {
        rank: Option<usize>,
        leaderboard: Vec<LeaderboardEntry>,
    },
    SaveFailed {
        message: String,
        retryable: bool,
    },
}

/// The runner task has stopped
#[derive(Debug, thiserror::Error)]
#[error("Game runner is not running")]
pub struct RunnerClosed;

/// Cloneable handle for driving a runner
#[derive(Clone)]
pub struct GameHandle {
    command_tx: mpsc::Sender<RunnerCommand>,
    event_tx: broadcast::Sender<RunnerEvent>,
}

impl GameHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<RunnerEvent> {
        self.event_tx.subscribe()
    }

    pub async fn send(&self, command: RunnerCommand) -> Result<(), RunnerClosed> {
        self.command_tx.send(command).await.map_err(|_| RunnerClosed)
    }

    pub async fn start(&self) -> Result<(), RunnerClosed> {
        self.send(RunnerCommand::Start).await
    }

    pub async fn input(&self, buffer: impl Into<String>) -> Result<(), RunnerClosed> {
        self.send(RunnerCommand::Input(buffer.into())).await
    }

    pub async fn stop(&self) -> Result<(), RunnerClosed> {
        self.send(RunnerCommand::Stop).await
    }

    pub async fn save_score(&self, name: impl Into<String>) -> Result<(), RunnerClosed> {
        self.send(RunnerCommand::SaveScore { name: name.into() }).await
    }
}

/// Session timers, reset on every start
struct Timers {
    frames: Interval,
    spawns: Interval,
    stagger: Interval,
    /// When the simulation was last advanced
    last_frame: Instant,
}

impl Timers {
    fn new(engine: &Engine) -> Self {
        let config = engine.config();
        let mut frames = interval(frame_duration());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut spawns = interval(config.spawn_interval);
        spawns.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stagger = interval(config.initial_stagger);
        stagger.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            frames,
            spawns,
            stagger,
            last_frame: Instant::now(),
        }
    }

    fn reset(&mut self) {
        self.frames.reset();
        self.spawns.reset();
        self.stagger.reset();
        self.last_frame = Instant::now();
    }

    /// Seconds since the previous frame; skipped frames are folded in
    fn frame_elapsed(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        elapsed.as_secs_f32()
    }
}

/// Result of a submission task, applied on the runner task
struct SaveReport {
    final_score: u32,
    event: RunnerEvent,
}

/// Drives an [`Engine`] from a frame clock, a spawn timer and commands
pub struct GameRunner {
    engine: Engine,
    command_rx: mpsc::Receiver<RunnerCommand>,
    event_tx: broadcast::Sender<RunnerEvent>,
    leaderboard: Option<LeaderboardClient>,
    leaderboard_size: usize,
    /// Score captured when the last session ended
    final_score: Option<u32>,
    /// Initial spawns still waiting for the stagger timer
    pending_initial: usize,
    save_tx: mpsc::UnboundedSender<SaveReport>,
    save_rx: mpsc::UnboundedReceiver<SaveReport>,
}

impl GameRunner {
    pub fn new(engine: Engine, leaderboard: Option<LeaderboardClient>) -> (Self, GameHandle) {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (event_tx, _) = broadcast::channel(256);
        let (save_tx, save_rx) = mpsc::unbounded_channel();

        let handle = GameHandle {
            command_tx,
            event_tx: event_tx.clone(),
        };

        let runner = Self {
            engine,
            command_rx,
            event_tx,
            leaderboard,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            final_score: None,
            pending_initial: 0,
            save_tx,
            save_rx,
        };

        (runner, handle)
    }

    /// Number of places used for the qualification check
    pub fn with_leaderboard_size(mut self, size: usize) -> Self {
        self.leaderboard_size = size;
        self
    }

    /// Run until every handle is dropped
    pub async fn run(mut self) {
        let mut timers = Timers::new(&self.engine);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command, &mut timers),
                    None => break,
                },
                Some(report) = self.save_rx.recv() => self.finish_save(report),
                _ = timers.frames.tick(), if self.engine.is_running() => {
                    self.engine.tick(timers.frame_elapsed());
                }
                _ = timers.spawns.tick(), if self.engine.is_running() => {
                    self.engine.spawn();
                }
                _ = timers.stagger.tick(), if self.engine.is_running() && self.pending_initial > 0 => {
                    self.pending_initial -= 1;
                    self.engine.spawn();
                }
            }

            self.publish();
        }

        self.engine.end();
        self.publish();
        info!("Game runner stopped");
    }

    fn handle_command(&mut self, command: RunnerCommand, timers: &mut Timers) {
        match command {
            RunnerCommand::Start => {
                if self.engine.end().is_some() {
                    // Abandoned session: forward its teardown without a save offer
                    for event in self.engine.drain_events() {
                        let _ = self.event_tx.send(RunnerEvent::Game(event));
                    }
                    debug!("Running session abandoned by restart");
                }
                self.final_score = None;
                self.engine.start();
                self.pending_initial = self.engine.config().initial_batch.saturating_sub(1);
                timers.reset();
            }
            RunnerCommand::Input(buffer) => {
                if let Some(result) = self.engine.handle_input(&buffer) {
                    debug!(?result, "Input classified");
                }
            }
            RunnerCommand::Stop => {
                self.engine.end();
            }
            RunnerCommand::SaveScore { name } => self.save_score(name),
        }
    }

    /// Forward engine events; react to the session ending
    fn publish(&mut self) {
        for event in self.engine.drain_events() {
            if let GameEvent::Ended { final_score } = event {
                self.final_score = Some(final_score);
                self.check_qualification(final_score);
            }
            // No subscribers is fine
            let _ = self.event_tx.send(RunnerEvent::Game(event));
        }
    }

    /// Fetch the top list off-task and report whether the score qualifies
    fn check_qualification(&self, final_score: u32) {
        let event_tx = self.event_tx.clone();
        let client = self.leaderboard.clone();
        let capacity = self.leaderboard_size;

        tokio::spawn(async move {
            let (top, leaderboard_error) = match client {
                Some(client) => match client.fetch_top(capacity).await {
                    Ok(top) => (top, None),
                    Err(e) => {
                        warn!(error = %e, "Leaderboard fetch failed, assuming it is empty");
                        (Vec::new(), Some(e.to_string()))
                    }
                },
                None => (Vec::new(), None),
            };

            let outcome = SessionOutcome {
                final_score,
                qualifies: qualifies(final_score, &top, capacity),
                top,
                leaderboard_error,
            };
            let _ = event_tx.send(RunnerEvent::Outcome(outcome));
        });
    }

    /// Submit the last final score once; a retryable failure gives it back
    fn save_score(&mut self, name: String) {
        let fail = |message: String, retryable: bool| {
            let _ = self.event_tx.send(RunnerEvent::SaveFailed { message, retryable });
        };

        let final_score = match (self.engine.is_running(), self.final_score) {
            (false, Some(score)) => score,
            _ => return fail("No finished game to save".to_string(), false),
        };

        if let Err(e) = validate_name(&name) {
            return fail(e.to_string(), false);
        }

        let Some(client) = self.leaderboard.clone() else {
            return fail("Leaderboard is not configured".to_string(), false);
        };

        self.final_score = None;
        let save_tx = self.save_tx.clone();
        tokio::spawn(async move {
            let event = match client.submit(&name, final_score).await {
                Ok(outcome) => RunnerEvent::ScoreSaved {
                    rank: outcome.rank,
                    leaderboard: outcome.leaderboard,
                },
                Err(e) => {
                    warn!(error = %e, "Score submission failed");
                    RunnerEvent::SaveFailed {
                        message: e.to_string(),
                        retryable: e.is_retryable(),
                    }
                }
            };
            let _ = save_tx.send(SaveReport { final_score, event });
        });
    }

    fn finish_save(&mut self, report: SaveReport) {
        let retryable = matches!(report.event, RunnerEvent::SaveFailed { retryable: true, .. });
        if retryable && self.final_score.is_none() && !self.engine.is_running() {
            self.final_score = Some(report.final_score);
        }
        let _ = self.event_tx.send(report.event);
    }
}
