//! Typing game simulation

pub mod engine;
pub mod events;
pub mod matcher;
pub mod physics;
pub mod runner;
pub mod session;
pub mod words;

pub use engine::{Engine, EngineConfig, TYPO_FEEDBACK};
pub use events::{GameEvent, RemovalReason};
pub use matcher::{InputMatcher, MatchResult};
pub use physics::{PhysicsSystem, Playfield, StepOutcome};
pub use runner::{GameHandle, GameRunner, RunnerClosed, RunnerCommand, RunnerEvent, SessionOutcome};
pub use session::{Phase, SessionState, Target, TargetId};
pub use words::{WordSource, DICTIONARY};
