//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    ui::Broker,
    usecase::{GetRoomDetailUseCase, GetRoomsUseCase, HealthCheckUseCase},
};

/// Shared application state
pub struct AppState {
    /// Broker（WebSocket イベントの処理とファンアウト）
    pub broker: Arc<Broker>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// HealthCheckUseCase（ヘルスチェックのユースケース）
    pub health_check_usecase: Arc<HealthCheckUseCase>,
}
