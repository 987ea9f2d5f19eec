//! Simulation engine: spawning, physics, difficulty ramp and loss condition

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::mem;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{GameEvent, RemovalReason};
use super::matcher::{InputMatcher, MatchResult};
use super::physics::{PhysicsSystem, Playfield, StepOutcome};
use super::session::{Phase, SessionState, Target, TargetId};
use super::words::WordSource;

/// Feedback shown after a typo
pub const TYPO_FEEDBACK: &str = "Virhe! Yritä uudelleen.";

/// Game tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub playfield: Playfield,
    /// Horizontal speed of new targets (px/s)
    pub base_speed: f32,
    /// Lower bound for a new target's horizontal speed (px/s)
    pub min_speed: f32,
    /// Random spread added to the horizontal speed (px/s)
    pub speed_jitter: f32,
    /// Bound for the random vertical speed (px/s)
    pub max_vertical_speed: f32,
    /// Horizontal speed gained per tick by targets and the base speed
    pub ramp_per_tick: f32,
    /// Base speed gained per completed word
    pub match_speed_bonus: f32,
    /// Maximum number of simultaneous targets
    pub max_active: usize,
    /// Targets spawned when a session starts
    pub initial_batch: usize,
    /// Delay between the initial spawns
    pub initial_stagger: Duration,
    /// Period of the spawn timer
    pub spawn_interval: Duration,
    /// Points per completed word
    pub points_per_word: u32,
    /// How long a typo effect lasts
    pub typo_duration: Duration,
    /// Words drawn for each session
    pub session_words: usize,
    /// Seed for deterministic sessions
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            base_speed: 30.0,
            min_speed: 20.0,
            speed_jitter: 10.0,
            max_vertical_speed: 40.0,
            ramp_per_tick: 0.01,
            match_speed_bonus: 6.0,
            max_active: 4,
            initial_batch: 3,
            initial_stagger: Duration::from_millis(300),
            spawn_interval: Duration::from_millis(2000),
            points_per_word: 10,
            typo_duration: Duration::from_millis(300),
            session_words: 200,
            seed: None,
        }
    }
}

/// The typing game simulation
pub struct Engine {
    config: EngineConfig,
    state: SessionState,
    session_id: Option<Uuid>,
    words: Vec<String>,
    word_source: WordSource,
    rng: ChaCha8Rng,
    speed: f32,
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let word_source = WordSource::new(config.seed);
        Self::with_word_source(config, word_source)
    }

    pub fn with_word_source(config: EngineConfig, word_source: WordSource) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha8Rng::from_entropy(),
        };
        let speed = config.base_speed;

        Self {
            config,
            state: SessionState::new(),
            session_id: None,
            words: Vec::new(),
            word_source,
            rng,
            speed,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn targets(&self) -> &[Target] {
        &self.state.targets
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Current base speed for new targets
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Words left to spawn this session
    pub fn words_remaining(&self) -> usize {
        self.words.len().saturating_sub(self.state.next_word_index)
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Begin a new session and spawn its first target.
    ///
    /// The rest of the initial batch is left to the caller's stagger timer.
    pub fn start(&mut self) -> Uuid {
        if self.is_running() {
            self.end();
        }

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.state.reset();
        self.words = self.word_source.next_batch(self.config.session_words);
        self.speed = self.config.base_speed;
        self.state.phase = Phase::Running;

        info!(
            session_id = %session_id,
            words = self.words.len(),
            "Game session started"
        );

        self.events.push(GameEvent::Started { session_id });
        self.push_score();
        self.spawn();

        session_id
    }

    /// Bring the next word into play.
    ///
    /// Returns `None` when not running, out of words, or at the target cap.
    pub fn spawn(&mut self) -> Option<TargetId> {
        if !self.is_running() || self.state.targets.len() >= self.config.max_active {
            return None;
        }

        let text = self.words.get(self.state.next_word_index)?.clone();
        let field = self.config.playfield;

        let y = self.rng.gen_range(0.0..=field.max_y());
        let jitter = self.config.speed_jitter.abs();
        let vx = (self.speed + self.rng.gen_range(-jitter..=jitter)).max(self.config.min_speed);
        let v_max = self.config.max_vertical_speed.abs();
        let vy = self.rng.gen_range(-v_max..=v_max);

        let id = self.state.next_word_index as TargetId;
        let target = Target {
            id,
            width: field.target_width(&text),
            height: field.target_height,
            text,
            x: 0.0,
            y,
            vx,
            vy,
        };

        debug!(id, text = %target.text, y, vx, vy, "Target spawned");

        self.events.push(GameEvent::TargetSpawned {
            id,
            text: target.text.clone(),
            x: target.x,
            y: target.y,
        });
        self.state.targets.push(target);
        self.state.next_word_index += 1;
        self.push_score();

        Some(id)
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// The first target (in spawn order) found at the right wall ends the
    /// session; targets after it are not moved this tick.
    pub fn tick(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        let field = self.config.playfield;
        let ramp = self.config.ramp_per_tick;
        let mut lost = false;

        for target in self.state.targets.iter_mut() {
            if PhysicsSystem::step(target, dt, &field) == StepOutcome::ReachedWall {
                debug!(id = target.id, text = %target.text, "Target reached the wall");
                lost = true;
                break;
            }
            target.vx += ramp;
        }

        if lost {
            self.end();
            return;
        }

        self.speed += ramp;
    }

    /// Classify the input buffer and apply its effects.
    ///
    /// Returns `None` when no session is running.
    pub fn handle_input(&mut self, buffer: &str) -> Option<MatchResult> {
        if !self.is_running() {
            return None;
        }

        let result = InputMatcher::classify(buffer, &self.state.targets);

        match result {
            MatchResult::Exact(id) => {
                self.set_highlight(None);
                self.state.remove_target(id);
                self.events.push(GameEvent::TargetRemoved {
                    id,
                    reason: RemovalReason::Matched,
                });
                self.events.push(GameEvent::InputCleared);
                self.state.award(self.config.points_per_word);
                self.speed += self.config.match_speed_bonus;
                self.push_score();
                self.set_feedback(None);
            }
            MatchResult::Partial(id) => {
                self.set_highlight(Some(id));
                self.set_feedback(None);
            }
            MatchResult::Miss => {
                if let Some(id) = self.state.leftmost().map(|t| t.id) {
                    self.events.push(GameEvent::Typo {
                        id,
                        duration_ms: self.config.typo_duration.as_millis() as u64,
                    });
                }
                self.set_highlight(None);
                self.set_feedback(Some(TYPO_FEEDBACK.to_string()));
            }
            MatchResult::Empty => {
                self.set_highlight(None);
                self.set_feedback(None);
            }
        }

        Some(result)
    }

    /// End the running session.
    ///
    /// Returns the final score, or `None` if no session was running.
    pub fn end(&mut self) -> Option<u32> {
        if !self.is_running() {
            return None;
        }

        self.state.phase = Phase::Ended;
        for target in self.state.targets.drain(..) {
            self.events.push(GameEvent::TargetRemoved {
                id: target.id,
                reason: RemovalReason::Cleared,
            });
        }
        self.state.highlighted = None;

        let final_score = self.state.score;
        self.events.push(GameEvent::Ended { final_score });

        if let Some(session_id) = self.session_id {
            info!(
                session_id = %session_id,
                final_score,
                words_spawned = self.state.next_word_index,
                "Game session ended"
            );
        }

        Some(final_score)
    }

    fn set_highlight(&mut self, id: Option<TargetId>) {
        if self.state.highlighted != id {
            self.state.highlighted = id;
            self.events.push(GameEvent::TargetHighlighted { id });
        }
    }

    fn set_feedback(&mut self, message: Option<String>) {
        if self.state.feedback != message {
            self.state.feedback = message.clone();
            self.events.push(GameEvent::Feedback { message });
        }
    }

    fn push_score(&mut self) {
        self.events.push(GameEvent::ScoreChanged {
            score: self.state.score,
            next_word_index: self.state.next_word_index,
        });
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
