//! Server -> Client messages and the broadcast game state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ServerMessageType;
use crate::{Color, Direction, ProtocolError};

/// One player's public state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(rename = "playerId")]
    pub player_id: String,
    pub x: usize,
    pub y: usize,
    pub color: Color,
    pub score: u32,
    pub direction: Direction,
}

/// One chat log line. Server announcements have no author color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(rename = "playerColor", default, skip_serializing_if = "Option::is_none")]
    pub author_color: Option<Color>,
    pub message: String,
}

/// Full game state as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: BTreeMap<String, PlayerSnapshot>,
    /// Rows indexed by `y`, cells by `x`; `null` is an unpainted cell.
    pub grid: Vec<Vec<Option<Color>>>,
    pub timer: u32,
    pub chat: Vec<ChatEntry>,
}

/// Server message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    CurrentPlayer {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    Update {
        #[serde(rename = "gameState")]
        game_state: GameSnapshot,
    },
    Chat { chat: Vec<ChatEntry> },
    Sound { sound: String },
}

impl ServerMessage {
    pub fn message_type(&self) -> ServerMessageType {
        match self {
            Self::CurrentPlayer { .. } => ServerMessageType::CurrentPlayer,
            Self::Update { .. } => ServerMessageType::Update,
            Self::Chat { .. } => ServerMessageType::Chat,
            Self::Sound { .. } => ServerMessageType::Sound,
        }
    }

    /// Encode to a JSON text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Decode a JSON text frame (used by clients and tests).
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Malformed)
    }
}
