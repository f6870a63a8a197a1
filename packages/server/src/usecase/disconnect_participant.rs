//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - ルームからの退出と Connection Registry からの登録解除
//!
//! ### なぜこのテストが必要か
//! - 切断時に残りのメンバーへ通知するための情報が返ることを保証
//! - 最後のメンバーが切断した場合にルームが削除されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム所属中の切断（残りメンバーあり / なし）
//! - エッジケース：未所属の接続の切断、同じ接続の二重切断

use std::sync::Arc;

use crate::domain::{ConnectionId, Departure, MessagePusher, RoomRepository};

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（Connection Registry の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// * `Some(Departure)` - 退出したルームとユーザー名、残りのメンバー
    /// * `None` - どのルームにも所属していなかった
    ///
    /// どちらの場合も接続は Connection Registry から登録解除される。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Departure> {
        // 1. Repository 経由でルームから退出（空になったルームは削除される）
        let departure = self.repository.remove_member(connection_id).await;

        // 2. MessagePusher から登録解除
        self.message_pusher.unregister_client(connection_id).await;

        departure
    }
}
