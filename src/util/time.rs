//! Time utilities for the game loop and the server

use std::time::{Duration, Instant};

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Frame clock rate for the game runner
pub const FRAME_TPS: u32 = 60; // 60 frames per second
pub const FRAME_DURATION_MICROS: u64 = 1_000_000 / FRAME_TPS as u64;

/// Duration of one frame
pub fn frame_duration() -> Duration {
    Duration::from_micros(FRAME_DURATION_MICROS)
}
