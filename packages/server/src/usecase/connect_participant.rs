//! UseCase: 接続受付処理
//!
//! 受け付けた WebSocket の送信チャンネルを Connection Registry に登録し、
//! 接続 ID を払い出す。登録直後の接続はどのルームにも所属していない（Unassigned）。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    /// MessagePusher（Connection Registry の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録し、接続 ID を返す（失敗しない）
    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        self.message_pusher.register_client(sender).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message_pusher::MockMessagePusher;

    #[tokio::test]
    async fn test_connect_registers_sender() {
        // テスト項目: 接続時に MessagePusher へ登録され、払い出された ID が返される
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_register_client()
            .times(1)
            .returning(|_| ConnectionId::new("conn-a".to_string()).unwrap());
        let usecase = ConnectParticipantUseCase::new(Arc::new(pusher));
        let (tx, _rx) = tokio::sync::mpsc::channel(8);

        // when (操作):
        let connection_id = usecase.execute(tx).await;

        // then (期待する結果):
        assert_eq!(connection_id.as_str(), "conn-a");
    }
}
