//! Per-connection event loop.
//!
//! Each client gets one task that owns the socket. Inbound lines are framed
//! by `LinesCodec` and run through the command registry; outbound messages
//! arrive on the session's bounded queue and are written back in order. The
//! loop ends on QUIT, EOF, or an I/O error, and all three paths converge on
//! the same idempotent disconnect.

use crate::config::LimitsConfig;
use crate::dispatch::MessageDispatcher;
use crate::handlers::{DispatchOutcome, Registry};
use crate::state::{ServerState, Session, SessionId};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use talk_proto::Message;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

/// Drive one client connection to completion.
pub async fn handle_connection(
    state: Arc<ServerState>,
    registry: Arc<Registry>,
    dispatcher: Arc<MessageDispatcher>,
    stream: TcpStream,
    peer: SocketAddr,
    session_id: SessionId,
    limits: LimitsConfig,
) {
    let codec = LinesCodec::new_with_max_length(limits.max_line_len);
    let (mut writer, mut reader) = Framed::new(stream, codec).split();

    let (tx, mut rx) = mpsc::channel(limits.outbound_queue);
    let session = Session::new(session_id, tx);

    info!(session = session_id, %peer, "client connected");
    session.send(Arc::new(Message::system(
        "Welcome! Please log in with: LOGIN:<username>",
    )));

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                // the sender side lives in the session and outlives this loop
                let Some(message) = outbound else { break };
                if let Err(error) = writer.send(message.encode()).await {
                    debug!(session = session_id, %error, "write failed");
                    break;
                }
            }
            inbound = reader.next() => {
                match inbound {
                    Some(Ok(line)) => {
                        let outcome = registry
                            .dispatch(&state, &dispatcher, &session, &line)
                            .await;
                        if outcome == DispatchOutcome::Quit {
                            debug!(session = session_id, "client quit");
                            break;
                        }
                    }
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        // the codec discards up to the next newline; the
                        // connection stays usable
                        let reply = Message::error(
                            session.username_or_star(),
                            format!(
                                "Line exceeds {} bytes and was ignored.",
                                limits.max_line_len
                            ),
                        );
                        if writer.send(reply.encode()).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(LinesCodecError::Io(error))) => {
                        warn!(session = session_id, %peer, %error, "read failed");
                        break;
                    }
                    None => {
                        debug!(session = session_id, "connection closed by peer");
                        break;
                    }
                }
            }
        }
    }

    state.disconnect(&session);

    // best-effort flush of anything queued before the disconnect
    rx.close();
    while let Ok(message) = rx.try_recv() {
        if writer.send(message.encode()).await.is_err() {
            break;
        }
    }
    let _ = writer.close().await;
}
