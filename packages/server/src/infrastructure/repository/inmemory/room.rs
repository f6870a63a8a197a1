//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 設計ノート
//!
//! ルームのマップと「接続 ID → ルーム ID」の逆引きインデックスを 1 つの Mutex で守る。
//! メンバーの追加・削除とインデックスの更新は常に同じロック区間で行うため、
//! 両者が食い違った状態は他の操作から観測できない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    AlreadyInRoomError, ConnectionId, Departure, RepositoryError, Room, RoomId, RoomIdFactory,
    RoomName, RoomRepository, Timestamp, Username,
};

#[derive(Debug, Default)]
struct RoomStore {
    /// Key: room_id
    rooms: HashMap<RoomId, Room>,
    /// 逆引きインデックス（Key: connection_id, Value: 所属ルームの room_id）
    memberships: HashMap<ConnectionId, RoomId>,
}

impl RoomStore {
    fn ensure_not_member_elsewhere(
        &self,
        connection_id: &ConnectionId,
        room_id: Option<&RoomId>,
    ) -> Result<(), AlreadyInRoomError> {
        match self.memberships.get(connection_id) {
            Some(current) if Some(current) != room_id => Err(AlreadyInRoomError {
                connection_id: connection_id.as_str().to_string(),
                room_id: current.as_str().to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// インメモリ Room Repository 実装
#[derive(Debug, Default)]
pub struct InMemoryRoomRepository {
    store: Mutex<RoomStore>,
}

impl InMemoryRoomRepository {
    /// 空の InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        name: RoomName,
        creator: ConnectionId,
        username: Username,
        created_at: Timestamp,
    ) -> Result<Room, AlreadyInRoomError> {
        let mut store = self.store.lock().await;
        store.ensure_not_member_elsewhere(&creator, None)?;

        let room_id = RoomIdFactory::generate();
        let room = Room::new(room_id.clone(), name, creator.clone(), username, created_at);

        store.memberships.insert(creator, room_id.clone());
        store.rooms.insert(room_id.clone(), room.clone());
        tracing::debug!("Room '{}' stored ({} rooms)", room_id, store.rooms.len());

        Ok(room)
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let store = self.store.lock().await;
        store.rooms.get(room_id).cloned()
    }

    async fn add_member(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        username: Username,
    ) -> Result<Room, RepositoryError> {
        let mut guard = self.store.lock().await;
        let store = &mut *guard;
        store.ensure_not_member_elsewhere(&connection_id, Some(room_id))?;

        let room = store
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;
        room.add_member(connection_id.clone(), username);
        store.memberships.insert(connection_id, room_id.clone());

        Ok(room.clone())
    }

    async fn remove_member(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let mut guard = self.store.lock().await;
        let store = &mut *guard;

        let room_id = store.memberships.remove(connection_id)?;
        let Some(room) = store.rooms.get_mut(&room_id) else {
            tracing::warn!(
                "Membership index pointed '{}' at missing room '{}'",
                connection_id,
                room_id
            );
            return None;
        };
        let username = room.remove_member(connection_id)?;
        let remaining_members = room.member_ids();

        if remaining_members.is_empty() {
            store.rooms.remove(&room_id);
            tracing::debug!("Room '{}' deleted (last member left)", room_id);
        }

        Some(Departure {
            room_id,
            username,
            remaining_members,
        })
    }

    async fn find_room_of(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        let store = self.store.lock().await;
        store.memberships.get(connection_id).cloned()
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let store = self.store.lock().await;
        let mut rooms: Vec<Room> = store.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        rooms
    }

    async fn count_rooms(&self) -> usize {
        let store = self.store.lock().await;
        store.rooms.len()
    }
}
