//! Session state: targets, score and lifecycle

use serde::{Deserialize, Serialize};

/// Target identifier (spawn index within the session)
pub type TargetId = u64;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No session started yet
    Idle,
    /// Timers active, input accepted
    Running,
    /// Session over, waiting for a new start
    Ended,
}

/// A word moving across the playfield
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
}

/// State of one game session (owned by the engine)
#[derive(Debug, Clone)]
pub struct SessionState {
    pub score: u32,
    pub next_word_index: usize,
    pub phase: Phase,
    /// Active targets in spawn order
    pub targets: Vec<Target>,
    /// Target currently matched by a partial input
    pub highlighted: Option<TargetId>,
    /// Error feedback shown to the player
    pub feedback: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            score: 0,
            next_word_index: 0,
            phase: Phase::Idle,
            targets: Vec::new(),
            highlighted: None,
            feedback: None,
        }
    }

    /// Reset for a new session, keeping the phase untouched
    pub fn reset(&mut self) {
        self.score = 0;
        self.next_word_index = 0;
        self.targets.clear();
        self.highlighted = None;
        self.feedback = None;
    }

    /// Add points for a completed word
    pub fn award(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Remove a target, preserving the order of the rest
    pub fn remove_target(&mut self, id: TargetId) -> Option<Target> {
        let pos = self.targets.iter().position(|t| t.id == id)?;
        if self.highlighted == Some(id) {
            self.highlighted = None;
        }
        Some(self.targets.remove(pos))
    }

    /// Leftmost (most urgent) target; ties go to the earliest spawned
    pub fn leftmost(&self) -> Option<&Target> {
        self.targets
            .iter()
            .min_by(|a, b| a.x.total_cmp(&b.x))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: TargetId, x: f32) -> Target {
        Target {
            id,
            text: format!("w{}", id),
            x,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            width: 10.0,
            height: 10.0,
        }
    }

    #[test]
    fn test_award_accumulates() {
        let mut state = SessionState::new();
        assert_eq!(state.award(10), 10);
        assert_eq!(state.award(10), 20);
    }

    #[test]
    fn test_reset_clears_session() {
        let mut state = SessionState::new();
        state.phase = Phase::Ended;
        state.award(30);
        state.next_word_index = 4;
        state.targets.push(target(0, 1.0));
        state.feedback = Some("typo".into());

        state.reset();
        assert_eq!(state.score, 0);
        assert_eq!(state.next_word_index, 0);
        assert!(state.targets.is_empty());
        assert!(state.feedback.is_none());
        assert_eq!(state.phase, Phase::Ended);
    }

    #[test]
    fn test_leftmost_prefers_first_on_tie() {
        let mut state = SessionState::new();
        state.targets.push(target(0, 50.0));
        state.targets.push(target(1, 20.0));
        state.targets.push(target(2, 20.0));

        assert_eq!(state.leftmost().map(|t| t.id), Some(1));
    }

    #[test]
    fn test_remove_target_keeps_order_and_clears_highlight() {
        let mut state = SessionState::new();
        state.targets.push(target(0, 1.0));
        state.targets.push(target(1, 2.0));
        state.targets.push(target(2, 3.0));
        state.highlighted = Some(1);

        let removed = state.remove_target(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(state.highlighted.is_none());
        let ids: Vec<_> = state.targets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(state.remove_target(1).is_none());
    }
}
