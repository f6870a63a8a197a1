//! Domain entities.

use std::collections::HashMap;

use super::value_object::{
    ConnectionId, MessageId, MessageText, RoomId, RoomName, Timestamp, Username,
};

/// Chat room entity
///
/// 名前付きの一時的なグループ。メンバーは接続 ID からユーザー名へのマップで保持し、
/// 送信先の WebSocket は Connection Registry 経由で毎回解決する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub members: HashMap<ConnectionId, Username>,
    pub created_at: Timestamp,
}

impl Room {
    /// Create a room whose only member is its creator
    pub fn new(
        id: RoomId,
        name: RoomName,
        creator: ConnectionId,
        username: Username,
        created_at: Timestamp,
    ) -> Self {
        let mut members = HashMap::new();
        members.insert(creator, username);
        Self {
            id,
            name,
            members,
            created_at,
        }
    }

    /// Insert or overwrite a member's username
    pub fn add_member(&mut self, connection_id: ConnectionId, username: Username) {
        self.members.insert(connection_id, username);
    }

    /// Remove a member, returning the username it was registered under
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Username> {
        self.members.remove(connection_id)
    }

    pub fn has_member(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains_key(connection_id)
    }

    pub fn username_of(&self, connection_id: &ConnectionId) -> Option<&Username> {
        self.members.get(connection_id)
    }

    pub fn member_ids(&self) -> Vec<ConnectionId> {
        self.members.keys().cloned().collect()
    }

    /// Member ids except `exclude`
    pub fn member_ids_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .keys()
            .filter(|id| *id != exclude)
            .cloned()
            .collect()
    }

    /// Usernames sorted alphabetically, for stable display
    pub fn usernames(&self) -> Vec<Username> {
        let mut usernames: Vec<Username> = self.members.values().cloned().collect();
        usernames.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        usernames
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Transient chat message, built for a single broadcast and never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Username,
    pub text: MessageText,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(id: MessageId, sender: Username, text: MessageText, timestamp: Timestamp) -> Self {
        Self {
            id,
            sender,
            text,
            timestamp,
        }
    }
}

/// Result of removing a connection from its room
///
/// `remaining_members` が空のとき、ルームは同じ操作の中で削除済み。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: RoomId,
    pub username: Username,
    pub remaining_members: Vec<ConnectionId>,
}

impl Departure {
    /// Whether the departure deleted the room
    pub fn room_deleted(&self) -> bool {
        self.remaining_members.is_empty()
    }
}
