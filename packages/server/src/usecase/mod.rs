//! UseCase layer.
//!
//! 各ユースケースは Repository（Room Registry）と MessagePusher（Connection Registry）の
//! trait にのみ依存し、具体的な実装には依存しない。

mod connect_participant;
mod create_room;
mod disconnect_participant;
mod error;
mod get_room_detail;
mod get_rooms;
mod health_check;
mod join_room;
mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{CreateRoomError, GetRoomDetailError, JoinRoomError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use health_check::{HealthCheckUseCase, HealthStatus};
pub use join_room::{JoinRoomUseCase, JoinedRoom};
pub use send_message::{ChatDelivery, SendMessageUseCase};
