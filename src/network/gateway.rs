//! Accept loop: one spawned task per inbound connection.

use crate::config::LimitsConfig;
use crate::dispatch::MessageDispatcher;
use crate::handlers::Registry;
use crate::network::connection;
use crate::state::ServerState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::warn;

/// Accept connections forever, spawning a connection task for each.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    registry: Arc<Registry>,
    dispatcher: Arc<MessageDispatcher>,
    limits: LimitsConfig,
) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                warn!(%error, "accept failed");
                continue;
            }
        };

        let session_id = state.next_session_id();
        tokio::spawn(connection::handle_connection(
            Arc::clone(&state),
            Arc::clone(&registry),
            Arc::clone(&dispatcher),
            stream,
            peer,
            session_id,
            limits.clone(),
        ));
    }
}
