//! Message definitions for the paintgrid protocol.
//!
//! Every frame is a JSON object carrying a `type` discriminator. This module
//! contains both client->server and server->client message types.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Discriminators for client -> server messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessageType {
    /// Chat line.
    Chat,
    /// Play a sound on every client.
    Sound,
    /// Steer the sender's avatar.
    ChangeDirection,
}

impl ClientMessageType {
    const ALL: [Self; 3] = [Self::Chat, Self::Sound, Self::ChangeDirection];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Sound => "sound",
            Self::ChangeDirection => "changeDirection",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

/// Discriminators for server -> client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessageType {
    /// Private: tells a new connection its own player id.
    CurrentPlayer,
    /// Full game state.
    Update,
    /// Full chat log.
    Chat,
    /// One-shot sound cue.
    Sound,
}

impl ServerMessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentPlayer => "currentPlayer",
            Self::Update => "update",
            Self::Chat => "chat",
            Self::Sound => "sound",
        }
    }
}
