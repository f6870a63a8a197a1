//! UI layer: the broker protocol and the HTTP / WebSocket surface.

mod broker;
mod handler;
mod server;
mod signal;
pub mod state;

pub use broker::Broker;
pub use server::Server;
