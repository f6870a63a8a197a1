//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::{AlreadyInRoomError, RepositoryError};

/// Errors of [`CreateRoomUseCase`](super::CreateRoomUseCase)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateRoomError {
    /// The connection is already a member of a room
    #[error("Connection is already in room '{0}'")]
    AlreadyInRoom(String),
}

/// Errors of [`JoinRoomUseCase`](super::JoinRoomUseCase)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinRoomError {
    /// The room id does not resolve to a live room
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// The connection is already a member of a room
    #[error("Connection is already in room '{0}'")]
    AlreadyInRoom(String),
}

/// Errors of [`GetRoomDetailUseCase`](super::GetRoomDetailUseCase)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),
}

impl From<AlreadyInRoomError> for CreateRoomError {
    fn from(error: AlreadyInRoomError) -> Self {
        Self::AlreadyInRoom(error.room_id)
    }
}

impl From<RepositoryError> for JoinRoomError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(room_id) => Self::RoomNotFound(room_id),
            RepositoryError::AlreadyInRoom(error) => Self::AlreadyInRoom(error.room_id),
        }
    }
}
