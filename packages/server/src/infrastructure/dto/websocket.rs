//! WebSocket frame DTOs for the chat broker.
//!
//! All frames are JSON objects tagged by a kebab-case `type` field,
//! with camelCase payload fields.

use serde::{Deserialize, Serialize};

/// Inbound frame sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientFrame {
    CreateRoom { room_name: String, username: String },
    JoinRoom { room_id: String, username: String },
    ChatMessage { text: String },
}

impl ClientFrame {
    /// Decode a frame from its JSON text
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Outbound message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    RoomCreated,
    RoomJoined,
    UserJoined,
    UserLeft,
    ChatMessage,
    Error,
}

/// Sent to the creator once the room exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreatedMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub room_name: String,
}

/// Sent to a client that joined an existing room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub room_name: String,
}

/// Member joined notification (sent to the other members)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserJoinedMessage {
    pub r#type: MessageType,
    pub username: String,
}

/// Member left notification (sent to the remaining members)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLeftMessage {
    pub r#type: MessageType,
    pub username: String,
}

/// Chat message delivered to every member, including the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub r#type: MessageType,
    pub id: String,
    pub sender: String,
    pub text: String,
    /// Unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

/// Error reported to the requesting client only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            message: message.into(),
        }
    }
}
