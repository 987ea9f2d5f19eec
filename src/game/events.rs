//! Engine notifications for renderers and the runner

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::TargetId;

/// Why a target left the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Typed correctly
    Matched,
    /// Cleared at session end
    Cleared,
}

/// Events emitted by the engine, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A new session began
    Started { session_id: Uuid },

    /// A target entered the playfield
    TargetSpawned {
        id: TargetId,
        text: String,
        x: f32,
        y: f32,
    },

    /// Detach the target from the view
    TargetRemoved { id: TargetId, reason: RemovalReason },

    /// Partial input now points at this target (`None` clears the highlight)
    TargetHighlighted { id: Option<TargetId> },

    /// Transient typo effect on a target
    Typo { id: TargetId, duration_ms: u64 },

    /// Error feedback changed (`None` clears it)
    Feedback { message: Option<String> },

    /// The input buffer should be emptied
    InputCleared,

    /// Score or progress changed
    ScoreChanged { score: u32, next_word_index: usize },

    /// Session over
    Ended { final_score: u32 },
}
