//! UseCase: ヘルスチェック

use std::sync::Arc;

use crate::domain::{MessagePusher, RoomRepository};

/// 接続数とルーム数のスナップショット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStatus {
    pub connections: usize,
    pub rooms: usize,
}

/// ヘルスチェックのユースケース
pub struct HealthCheckUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl HealthCheckUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn execute(&self) -> HealthStatus {
        HealthStatus {
            connections: self.message_pusher.count_connections().await,
            rooms: self.repository.count_rooms().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::message_pusher::MockMessagePusher,
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_health_check_reports_counts() {
        // テスト項目: 接続数とルーム数が返される
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher.expect_count_connections().return_const(3usize);
        let usecase =
            HealthCheckUseCase::new(Arc::new(InMemoryRoomRepository::new()), Arc::new(pusher));

        // when (操作):
        let status = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(
            status,
            HealthStatus {
                connections: 3,
                rooms: 0
            }
        );
    }
}
