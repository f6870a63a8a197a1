//! WebSocket を使った MessagePusher 実装（Connection Registry）
//!
//! ## 責務
//!
//! - 接続 ID の払い出しと、接続ごとの送信キュー（`mpsc::Sender`）の管理
//! - クライアントへのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `Sender` を受け取り、メッセージ送信に使用します。
//! 送信は `try_send` でキューに積むだけでブロックしないため、遅いクライアントが
//! 他のクライアントへの配送を止めることはありません。キューが満杯の宛先は
//! 切断済みと同じく配送失敗として扱います。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionIdFactory, MessagePushError, MessagePusher, PusherChannel,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// let (tx, rx) = tokio::sync::mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
/// let connection_id = pusher.register_client(tx).await;
///
/// pusher.push_to(&connection_id, "{\"type\":\"user-left\",\"username\":\"bob\"}").await?;
/// ```
#[derive(Debug, Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: connection_id
    /// Value: PusherChannel
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionIdFactory::generate();
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id.clone(), sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        connection_id
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
    }

    async fn lookup(&self, connection_id: &ConnectionId) -> Option<PusherChannel> {
        let clients = self.clients.lock().await;
        clients.get(connection_id).cloned()
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.as_str().to_string()))?;
        sender
            .try_send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) {
        let clients = self.clients.lock().await;

        for target in targets {
            let Some(sender) = clients.get(&target) else {
                // 切断と競合した宛先。配送漏れとして扱う
                tracing::debug!("Connection '{}' not found during broadcast, skipping", target);
                continue;
            };
            if let Err(e) = sender.try_send(content.to_string()) {
                tracing::warn!("Failed to push message to connection '{}': {}", target, e);
            }
        }
    }

    async fn count_connections(&self) -> usize {
        let clients = self.clients.lock().await;
        clients.len()
    }
}
