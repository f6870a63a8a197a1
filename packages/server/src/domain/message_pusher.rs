//! MessagePusher trait 定義（Connection Registry）
//!
//! 接続 ID から送信用ハンドルへのマップを管理し、メッセージを届ける。
//! ハンドルの実体（WebSocket など）は Infrastructure 層 / UI 層が決める。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 接続ごとの送信キューの容量
///
/// キューが埋まった（読み出しが止まった）クライアントは「宛先なし」として扱う。
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// クライアントへの送信チャンネル
///
/// 受信側は接続ごとの writer タスクが保持し、ソケットへ書き出す。
pub type PusherChannel = mpsc::Sender<String>;

/// MessagePusher trait
///
/// 送信は fire-and-forget。遅い・切断済みの受信者がいても他の受信者への配送は止まらない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 新しい接続を登録し、払い出した接続 ID を返す
    async fn register_client(&self, sender: PusherChannel) -> ConnectionId;

    /// 接続の登録を解除（冪等）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 接続中のハンドルを取得（解除済みなら `None`）
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<PusherChannel>;

    /// 特定のクライアントに送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信
    ///
    /// 見つからない・キューが満杯・切断済みの宛先は黙ってスキップする。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str);

    /// 接続中のクライアント数
    async fn count_connections(&self) -> usize;
}
