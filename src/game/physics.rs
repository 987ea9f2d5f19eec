//! Target physics and playfield constraints

use super::session::Target;

/// Playfield and glyph metrics
#[derive(Debug, Clone, Copy)]
pub struct Playfield {
    /// Playfield width in pixels
    pub width: f32,
    /// Playfield height in pixels
    pub height: f32,
    /// Rendered height of a target
    pub target_height: f32,
    /// Approximate rendered width of one glyph
    pub char_width: f32,
    /// Horizontal padding around a target's text
    pub target_padding: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            target_height: 40.0,
            char_width: 12.0,
            target_padding: 16.0,
        }
    }
}

impl Playfield {
    /// Rendered width of a target showing `text`
    pub fn target_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width + self.target_padding
    }

    /// Highest valid `y` for a target's top edge
    pub fn max_y(&self) -> f32 {
        (self.height - self.target_height).max(0.0)
    }
}

/// Result of advancing a single target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still inside the playfield
    InPlay,
    /// Touched or crossed the right wall
    ReachedWall,
}

/// Physics system for moving targets
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance a target by its velocity over `dt` seconds.
    ///
    /// Vertical bounds bounce elastically. The right wall is reported, not
    /// resolved.
    pub fn step(target: &mut Target, dt: f32, field: &Playfield) -> StepOutcome {
        target.x += target.vx * dt;
        target.y += target.vy * dt;

        Self::bounce_vertical(target, field);

        if Self::hits_right_wall(target, field) {
            StepOutcome::ReachedWall
        } else {
            StepOutcome::InPlay
        }
    }

    /// Clamp to the top/bottom bound and reflect the vertical velocity
    pub fn bounce_vertical(target: &mut Target, field: &Playfield) {
        let bottom = field.height - target.height;

        if target.y <= 0.0 {
            target.y = 0.0;
            target.vy = target.vy.abs();
        } else if target.y >= bottom {
            target.y = bottom.max(0.0);
            target.vy = -target.vy.abs();
        }
    }

    /// Check whether the target's right edge reached the wall
    pub fn hits_right_wall(target: &Target, field: &Playfield) -> bool {
        target.x + target.width >= field.width
    }
}
