//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：未所属の接続がルームを作成し、唯一のメンバーになる
//! - 異常系：既にルームに所属している接続が作成を試みる

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{ConnectionId, Room, RoomName, RoomRepository, Timestamp, Username};

use super::error::CreateRoomError;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 作成者の接続 ID
    /// * `room_name` - ルームの表示名
    /// * `username` - 作成者の表示名
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 作成したルーム（作成者のみがメンバー）
    /// * `Err(CreateRoomError::AlreadyInRoom)` - 既にルームに所属している
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_name: RoomName,
        username: Username,
    ) -> Result<Room, CreateRoomError> {
        let created_at = Timestamp::new(self.clock.now_millis());
        let room = self
            .repository
            .create_room(room_name, connection_id, username, created_at)
            .await?;
        Ok(room)
    }
}
