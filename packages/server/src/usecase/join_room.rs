//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加処理と通知対象（参加者以外の既存メンバー）の選定
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存ルームへの参加
//! - 異常系：存在しない・不正な形式のルーム ID、既にルームに所属している接続

use std::sync::Arc;

use crate::domain::{ConnectionId, Room, RoomId, RoomRepository, Username};

use super::error::JoinRoomError;

/// 参加結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    /// 参加後のルーム
    pub room: Room,
    /// `user-joined` を通知する既存メンバー（参加者自身を除く）
    pub notify_targets: Vec<ConnectionId>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続の ID
    /// * `room_id` - クライアントが指定したルーム ID（未検証の文字列）
    /// * `username` - 参加者の表示名
    ///
    /// # Returns
    ///
    /// * `Ok(JoinedRoom)` - 参加成功
    /// * `Err(JoinRoomError)` - ルームが存在しない / 既にルームに所属している。
    ///   いずれの場合もどのルームのメンバーも変更されない
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: String,
        username: Username,
    ) -> Result<JoinedRoom, JoinRoomError> {
        // 1. 参加済みチェック（Unassigned の接続のみ参加できる）
        if let Some(current) = self.repository.find_room_of(&connection_id).await {
            return Err(JoinRoomError::AlreadyInRoom(current.into_string()));
        }

        // 2. ルーム ID の検証（形式が不正なら存在しないルームとして扱う）
        let room_id =
            RoomId::try_from(room_id.clone()).map_err(|_| JoinRoomError::RoomNotFound(room_id))?;

        // 3. Repository にメンバーを追加
        let room = self
            .repository
            .add_member(&room_id, connection_id.clone(), username)
            .await?;

        // 4. 通知対象を取得（参加者以外の全てのメンバー）
        let notify_targets = room.member_ids_except(&connection_id);

        Ok(JoinedRoom {
            room,
            notify_targets,
        })
    }
}
