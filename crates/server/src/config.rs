//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults, then apply
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `PORT` and `PAINTGRID_WEB_ROOT` overrides. Unparseable values are
    /// logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(e) => warn!("Ignoring invalid PORT {:?}: {}", port, e),
            }
        }
        if let Some(root) = lookup("PAINTGRID_WEB_ROOT").filter(|r| !r.is_empty()) {
            self.server.web_root = PathBuf::from(root);
        }
    }
}

/// Server networking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the built front-end.
    #[serde(default = "default_web_root")]
    pub web_root: PathBuf,
    /// Frames a connection may fall behind before it starts skipping.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            web_root: default_web_root(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_web_root() -> PathBuf {
    PathBuf::from("build")
}
fn default_broadcast_capacity() -> usize {
    64
}

/// Simulation and round timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameConfig {
    /// Movement tick interval in milliseconds. One cell per tick, so this sets
    /// the avatar speed.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Round countdown interval in milliseconds.
    #[serde(default = "default_round_interval")]
    pub round_interval_ms: u64,
    /// Countdown start value, in round ticks.
    #[serde(default = "default_round_seconds")]
    pub round_seconds: u32,
    /// Number of places named in the round summary.
    #[serde(default = "default_podium_size")]
    pub podium_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            round_interval_ms: default_round_interval(),
            round_seconds: default_round_seconds(),
            podium_size: default_podium_size(),
        }
    }
}

fn default_tick_interval() -> u64 {
    50
}
fn default_round_interval() -> u64 {
    1000
}
fn default_round_seconds() -> u32 {
    60
}
fn default_podium_size() -> usize {
    3
}
