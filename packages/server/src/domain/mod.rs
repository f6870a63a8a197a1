//! Domain layer for the chat broker.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.
//!
//! - `repository`: Room Registry のインターフェース
//! - `message_pusher`: Connection Registry（メッセージ送信）のインターフェース

pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Departure, Room};
pub use error::{AlreadyInRoomError, MessagePushError, RepositoryError, ValueObjectError};
pub use factory::{ConnectionIdFactory, MessageIdFactory, RoomIdFactory};
pub use message_pusher::{MessagePusher, OUTBOUND_QUEUE_CAPACITY, PusherChannel};
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, MessageId, MessageText, RoomId, RoomName, Timestamp, Username};
