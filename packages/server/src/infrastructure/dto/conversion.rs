//! Conversion logic from domain entities to DTOs.

use hiroba_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{ChatMessage, Room, Timestamp, Username};
use crate::infrastructure::dto::{http, websocket as ws};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&ChatMessage> for ws::ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            r#type: ws::MessageType::ChatMessage,
            id: model.id.as_str().to_string(),
            sender: model.sender.as_str().to_string(),
            text: model.text.as_str().to_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<&Room> for ws::RoomCreatedMessage {
    fn from(room: &Room) -> Self {
        Self {
            r#type: ws::MessageType::RoomCreated,
            room_id: room.id.as_str().to_string(),
            room_name: room.name.as_str().to_string(),
        }
    }
}

impl From<&Room> for ws::RoomJoinedMessage {
    fn from(room: &Room) -> Self {
        Self {
            r#type: ws::MessageType::RoomJoined,
            room_id: room.id.as_str().to_string(),
            room_name: room.name.as_str().to_string(),
        }
    }
}

impl ws::UserJoinedMessage {
    pub fn new(username: &Username) -> Self {
        Self {
            r#type: ws::MessageType::UserJoined,
            username: username.as_str().to_string(),
        }
    }
}

impl ws::UserLeftMessage {
    pub fn new(username: &Username) -> Self {
        Self {
            r#type: ws::MessageType::UserLeft,
            username: username.as_str().to_string(),
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

fn format_created_at(timestamp: Timestamp) -> String {
    timestamp_to_jst_rfc3339(timestamp.value()).unwrap_or_else(|| timestamp.to_string())
}

impl From<&Room> for http::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.as_str().to_string(),
            members: room.usernames().into_iter().map(Username::into_string).collect(),
            created_at: format_created_at(room.created_at),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.as_str().to_string(),
            member_count: room.member_count(),
            members: room
                .usernames()
                .into_iter()
                .map(|username| http::MemberDetailDto {
                    username: username.into_string(),
                })
                .collect(),
            created_at: format_created_at(room.created_at),
        }
    }
}
