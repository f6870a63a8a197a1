//! Hiroba chat broker server.
//!
//! Clients connect over WebSocket, create or join rooms, and exchange chat messages
//! with the other members of their room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --log-level debug
//! ```

use std::sync::Arc;

use clap::Parser;
use hiroba_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{Broker, Server},
    usecase::{GetRoomDetailUseCase, GetRoomsUseCase, HealthCheckUseCase},
};
use hiroba_shared::{
    logger::setup_logger,
    time::{MonotonicClock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Room-based WebSocket chat broker", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Broker and UseCases
    // 4. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (connection registry)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create Broker and UseCases
    let clock = Arc::new(MonotonicClock::new(SystemClock));
    let broker = Arc::new(Broker::new(
        repository.clone(),
        message_pusher.clone(),
        clock,
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository.clone()));
    let health_check_usecase = Arc::new(HealthCheckUseCase::new(repository, message_pusher));

    // 4. Create and run the server
    let server = Server::new(
        broker,
        get_rooms_usecase,
        get_room_detail_usecase,
        health_check_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
