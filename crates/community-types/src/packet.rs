//! Chat packet envelope.
//!
//! Every chat message travels as a packet: a header with routing metadata
//! and a payload with the message text. The history endpoint returns a list
//! of packets, and the send endpoint takes one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const PROTOCOL_VERSION: &str = "1.0";
pub const DEFAULT_CHANNEL: &str = "lobby";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Chat,
    System,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketHeader {
    pub version: String,
    pub message_type: MessageType,
    pub message_id: String,
    pub sender: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    pub timestamp: String,
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketPayload {
    pub body: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: PacketPayload,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),
    #[error("sender is required")]
    MissingSender,
    #[error("payload.body is required")]
    MissingBody,
}

impl Packet {
    /// Build an outgoing CHAT packet stamped with a fresh id and the current time.
    pub fn chat(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self::chat_at(sender, body, Uuid::new_v4(), Utc::now())
    }

    pub fn chat_at(
        sender: impl Into<String>,
        body: impl Into<String>,
        message_id: Uuid,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            header: PacketHeader {
                version: PROTOCOL_VERSION.to_string(),
                message_type: MessageType::Chat,
                message_id: message_id.to_string(),
                sender: sender.into(),
                channel: DEFAULT_CHANNEL.to_string(),
                timestamp: at.to_rfc3339(),
            },
            payload: PacketPayload {
                body: body.into(),
                metadata: serde_json::Map::new(),
            },
        }
    }

    /// Check the packet against the contract the backend enforces on send.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.header.version != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(self.header.version.clone()));
        }
        if self.header.sender.is_empty() {
            return Err(ProtocolError::MissingSender);
        }
        if self.payload.body.is_empty() {
            return Err(ProtocolError::MissingBody);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Ai,
}

/// Read-only view of a chat packet. Never mutated after it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub channel: String,
    pub kind: MessageKind,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_ai(&self) -> bool {
        self.kind == MessageKind::Ai
    }
}

impl From<&Packet> for Message {
    fn from(packet: &Packet) -> Self {
        let header = &packet.header;
        let kind = match header.message_type {
            MessageType::Ai => MessageKind::Ai,
            MessageType::Chat | MessageType::System => MessageKind::User,
        };
        let timestamp = crate::timestamp::parse(&header.timestamp).unwrap_or_else(|| {
            warn!("Corrupt timestamp '{}' on packet '{}'", header.timestamp, header.message_id);
            DateTime::default()
        });

        Message {
            id: header.message_id.clone(),
            sender: header.sender.clone(),
            channel: header.channel.clone(),
            kind,
            body: packet.payload.body.clone(),
            timestamp,
        }
    }
}
