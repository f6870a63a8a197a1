//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - チャットメッセージの組み立て（ID、送信者名、タイムスタンプ）と配送対象の選定
//!
//! ### なぜこのテストが必要か
//! - 送信者を含むルームの全メンバーに配送されることを保証
//! - 送信者名がクライアントの申告ではなくルームのメンバー情報から解決されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム所属中の送信
//! - エッジケース：どのルームにも所属していない接続からの送信（何もしない）

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MessageIdFactory, MessageText, RoomRepository, Timestamp,
};

/// 配送内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDelivery {
    pub message: ChatMessage,
    /// ルームの全メンバー（送信者を含む）
    pub targets: Vec<ConnectionId>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（Room Registry の抽象化）
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Some(ChatDelivery)` - 配送するメッセージと宛先
    /// * `None` - 送信者がどのルームにも所属していない（配送もエラーもなし）
    pub async fn execute(
        &self,
        from_connection_id: &ConnectionId,
        text: MessageText,
    ) -> Option<ChatDelivery> {
        // 1. 送信者の所属ルームを解決
        let room_id = self.repository.find_room_of(from_connection_id).await?;
        let room = self.repository.get_room(&room_id).await?;

        // 2. 送信者名をメンバー情報から解決
        let sender = room.username_of(from_connection_id)?.clone();

        // 3. メッセージを組み立て
        let message = ChatMessage::new(
            MessageIdFactory::generate(),
            sender,
            text,
            Timestamp::new(self.clock.now_millis()),
        );

        Some(ChatDelivery {
            message,
            targets: room.member_ids(),
        })
    }
}
