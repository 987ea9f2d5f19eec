//! Typing game engine and leaderboard server

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod leaderboard;
pub mod store;
pub mod util;
