//! Shared protocol crate for paintgrid.
//!
//! This crate contains:
//! - JSON message definitions for both directions (tagged by `type`)
//! - Snapshot types making up the broadcast game state
//! - Shared types (Color, Direction) and the fixed sound table

mod error;
pub mod packets;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use error::ProtocolError;

/// Width and height of the shared grid, in cells.
pub const GRID_SIZE: usize = 50;

/// Sound identifiers known to both sides, addressed by index.
pub const SOUNDS: [&str; 6] = [
    "sound1.mp3",
    "sound2.mp3",
    "sound3.mp3",
    "sound4.mp3",
    "sound5.mp3",
    "sound6.mp3",
];

/// Resolve a client-supplied sound index. Negative or out-of-range indices yield `None`.
pub fn sound_for_index(index: i64) -> Option<&'static str> {
    usize::try_from(index).ok().and_then(|i| SOUNDS.get(i).copied())
}

/// RGB color identifying a player and the cells they own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pick a color uniformly from the full RGB space.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random(), rng.random(), rng.random())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ProtocolError::InvalidColor(s.to_string()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ProtocolError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-tick movement step of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Direction {
    #[serde(deserialize_with = "unit_step")]
    pub dx: i32,
    #[serde(deserialize_with = "unit_step")]
    pub dy: i32,
}

/// Read one direction component of any integer size, saturated to `-1..=1`.
fn unit_step<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.fract() != 0.0 {
        return Err(serde::de::Error::custom(format!(
            "direction component {value} is not an integer"
        )));
    }
    Ok(value.clamp(-1.0, 1.0) as i32)
}

impl Direction {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Clamp both components to `-1..=1`.
    pub fn clamped(self) -> Self {
        Self::new(self.dx.clamp(-1, 1), self.dy.clamp(-1, 1))
    }
}
