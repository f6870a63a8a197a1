//! Hiroba: an in-process chat room broker over WebSocket.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
