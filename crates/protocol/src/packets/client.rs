//! Client -> Server message parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ClientMessageType;
use crate::{Direction, ProtocolError};

/// Parsed client message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Chat line. An empty message is accepted here and ignored by the server.
    Chat {
        #[serde(default)]
        message: String,
    },
    /// Sound cue by index into [`crate::SOUNDS`].
    Sound {
        #[serde(rename = "soundIndex")]
        sound_index: i64,
    },
    /// New movement direction for the sender.
    ChangeDirection { direction: Direction },
}

impl ClientMessage {
    /// Parse a client message from a text frame.
    ///
    /// Unrecognised tags are reported separately from malformed payloads so the
    /// caller can log them differently.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;
        if ClientMessageType::from_tag(tag).is_none() {
            return Err(ProtocolError::UnknownType(tag.to_string()));
        }
        serde_json::from_value(value).map_err(ProtocolError::Malformed)
    }

    pub fn message_type(&self) -> ClientMessageType {
        match self {
            Self::Chat { .. } => ClientMessageType::Chat,
            Self::Sound { .. } => ClientMessageType::Sound,
            Self::ChangeDirection { .. } => ClientMessageType::ChangeDirection,
        }
    }

    /// Encode to a JSON text frame (used by clients and tests).
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_change_direction() {
        let msg = ClientMessage::parse(r#"{"type":"changeDirection","direction":{"dx":0,"dy":-1}}"#)
            .unwrap();
        assert_eq!(
            msg,
            ClientMessage::ChangeDirection {
                direction: Direction::new(0, -1)
            }
        );
    }

    #[test]
    fn test_parse_sound_and_chat() {
        let msg = ClientMessage::parse(r#"{"type":"sound","soundIndex":3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Sound { sound_index: 3 });

        let msg = ClientMessage::parse(r#"{"type":"chat","message":"hi"}"#).unwrap();
        assert_eq!(msg.message_type(), ClientMessageType::Chat);

        let msg = ClientMessage::parse(r#"{"type":"chat"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Chat { message: String::new() });
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ClientMessage::parse("{not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"message":"no tag"}"#),
            Err(ProtocolError::MissingType)
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"dance"}"#),
            Err(ProtocolError::UnknownType(tag)) if tag == "dance"
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"changeDirection"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            ClientMessage::parse(r#"{"type":"sound","soundIndex":"loud"}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }
}
