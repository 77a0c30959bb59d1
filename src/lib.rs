//! talkd is a line-protocol multi-room chat daemon.
//!
//! Clients connect over TCP, log in with a unique username, and exchange
//! room-scoped, private, and system messages. Inbound lines are
//! `COMMAND:payload` or the strict `REQ|COMMAND|payload`; outbound lines are
//! `TYPE|SENDER|RECIPIENT|CONTENT`. The wire grammar lives in the
//! `talk-proto` crate; this crate is the runtime.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;

pub use config::Config;

use crate::dispatch::MessageDispatcher;
use crate::handlers::Registry;
use crate::state::ServerState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Bind the configured address and serve until the process is stopped.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    run_with_listener(config, listener).await
}

/// Serve on an already-bound listener.
///
/// Integration tests bind port 0 themselves and pass the listener in, so
/// the server runs in-process on an ephemeral port.
pub async fn run_with_listener(config: Config, listener: TcpListener) -> anyhow::Result<()> {
    let state = Arc::new(ServerState::new());
    if let Some(room) = state.rooms.create_room(&config.server.seed_room) {
        info!(room = room.id(), name = room.name(), "seed room created");
    }

    let registry = Arc::new(Registry::new());
    let dispatcher = Arc::new(MessageDispatcher::new(Arc::clone(&state)));

    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    network::gateway::serve(listener, state, registry, dispatcher, config.limits).await
}
