//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ConnectionId validation error
    #[error("ConnectionId cannot be empty")]
    ConnectionIdEmpty,

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },
}

/// Errors returned by the Room Registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested room does not exist (never created, or deleted when emptied)
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// The connection is already a member of another room
    #[error(transparent)]
    AlreadyInRoom(#[from] AlreadyInRoomError),
}

/// A connection tried to enter a room while it is a member of another one
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Connection '{connection_id}' is already a member of room '{room_id}'")]
pub struct AlreadyInRoomError {
    pub connection_id: String,
    pub room_id: String,
}

/// Errors returned by the Connection Registry when pushing to a single client
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagePushError {
    /// No live handle is registered for the connection
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// The handle exists but the transport is already closed
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
