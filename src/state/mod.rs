//! Shared server state: the user directory, session registry, and room
//! directory, each with its own synchronization. There is no global lock.

mod room;
mod session;
mod user;

pub use room::{Room, RoomDirectory};
pub use session::{Session, SessionId, SessionRegistry};
pub use user::{User, UserDirectory, UserStatus};

#[cfg(test)]
pub(crate) use session::testing;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// The shared registries, passed by `Arc` into every connection task.
/// Tests build a fresh instance each; nothing here is a process-wide
/// singleton.
#[derive(Debug)]
pub struct ServerState {
    pub users: UserDirectory,
    pub sessions: SessionRegistry,
    pub rooms: RoomDirectory,
    next_session_id: AtomicU64,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            users: UserDirectory::new(),
            sessions: SessionRegistry::new(),
            rooms: RoomDirectory::new(),
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn next_session_id(&self) -> SessionId {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Tear down one session: leave its room (firing the departure notice),
    /// then drop it from both registries if it was authenticated.
    ///
    /// Idempotent: triggered by both I/O failure and an explicit QUIT, the
    /// cleanup still runs exactly once.
    pub fn disconnect(&self, session: &Arc<Session>) {
        if !session.mark_disconnected() {
            return;
        }

        if let Some(room) = session.take_room() {
            room.remove_member(session);
        }

        match session.username() {
            Some(username) => {
                self.sessions.unregister(username);
                self.users.unregister(username);
                info!(session = session.id(), username, "client disconnected");
            }
            None => {
                info!(session = session.id(), "client disconnected (unauthenticated)");
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
