//! Paintgrid game server library.

pub mod config;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use server::{AppState, GameState, SharedGame, build_app, run, serve};
