//! Per-connection session state and the online-session registry.

use crate::state::Room;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use talk_proto::Message;
use tokio::sync::mpsc;
use tracing::debug;

/// Unique identifier for a connection/session.
pub type SessionId = u64;

/// Server-side state for one live client connection.
///
/// A session is bound to at most one user identity for its lifetime (set
/// once at login, never changed) and belongs to at most one room at a time.
/// All outbound traffic to the client goes through [`Session::send`], which
/// queues onto the connection task's writer and never blocks.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    username: OnceLock<String>,
    current_room: Mutex<Option<Arc<Room>>>,
    alive: AtomicBool,
    outbound: mpsc::Sender<Arc<Message>>,
}

impl Session {
    pub fn new(id: SessionId, outbound: mpsc::Sender<Arc<Message>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            username: OnceLock::new(),
            current_room: Mutex::new(None),
            alive: AtomicBool::new(true),
            outbound,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The identity bound at login, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    /// Bind the identity. Returns `false` if an identity was already set.
    pub fn set_username(&self, username: &str) -> bool {
        self.username.set(username.to_string()).is_ok()
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.get().is_some()
    }

    /// Identity for addressing replies; `*` until login completes.
    pub fn username_or_star(&self) -> &str {
        self.username().unwrap_or("*")
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn current_room(&self) -> Option<Arc<Room>> {
        self.current_room.lock().clone()
    }

    pub fn set_room(&self, room: Arc<Room>) {
        *self.current_room.lock() = Some(room);
    }

    /// Clear and return the current room pointer.
    pub fn take_room(&self) -> Option<Arc<Room>> {
        self.current_room.lock().take()
    }

    /// Queue one message for delivery to this client.
    ///
    /// Fire-and-forget: returns `false` without blocking when the session is
    /// disconnected or its queue is full, so one slow recipient never stalls
    /// a broadcast.
    pub fn send(&self, message: Arc<Message>) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.outbound.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(session = self.id, "outbound queue full, dropping line");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Flip the alive flag. Returns `true` only for the caller that actually
    /// performed the transition, making disconnect cleanup run exactly once.
    pub(crate) fn mark_disconnected(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }
}

/// Maps username to live session handle: the source of truth for who is
/// online and reachable. Entries exist iff the session has completed login
/// and has not yet disconnected.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, username: &str, session: Arc<Session>) {
        self.sessions.insert(username.to_string(), session);
    }

    pub fn unregister(&self, username: &str) {
        self.sessions.remove(username);
    }

    pub fn get(&self, username: &str) -> Option<Arc<Session>> {
        self.sessions.get(username).map(|s| Arc::clone(&s))
    }

    pub fn is_online(&self, username: &str) -> bool {
        self.sessions.contains_key(username)
    }

    /// Snapshot of every online session, safe to iterate while sessions
    /// register and unregister concurrently.
    pub fn all_sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.iter().map(|s| Arc::clone(&s)).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Test helpers for building sessions without a real connection.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A session wired to an in-memory queue, plus its receiving end.
    pub(crate) fn session_pair(id: SessionId) -> (Arc<Session>, mpsc::Receiver<Arc<Message>>) {
        let (tx, rx) = mpsc::channel(16);
        (Session::new(id, tx), rx)
    }

    /// A logged-in session.
    pub(crate) fn logged_in(
        id: SessionId,
        username: &str,
    ) -> (Arc<Session>, mpsc::Receiver<Arc<Message>>) {
        let (session, rx) = session_pair(id);
        assert!(session.set_username(username));
        (session, rx)
    }

    /// Drain everything currently queued for a session.
    pub(crate) fn drain(rx: &mut mpsc::Receiver<Arc<Message>>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push((*msg).clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn identity_is_set_once() {
        let (session, _rx) = session_pair(1);
        assert!(!session.is_logged_in());
        assert_eq!(session.username_or_star(), "*");
        assert!(session.set_username("alice"));
        assert!(!session.set_username("bob"));
        assert_eq!(session.username(), Some("alice"));
    }

    #[test]
    fn send_after_disconnect_is_a_noop() {
        let (session, mut rx) = session_pair(1);
        assert!(session.send(Arc::new(Message::system("one"))));
        assert!(session.mark_disconnected());
        assert!(!session.mark_disconnected());
        assert!(!session.send(Arc::new(Message::system("two"))));

        let queued = drain(&mut rx);
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].content, "one");
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let session = Session::new(1, tx);
        assert!(session.send(Arc::new(Message::system("kept"))));
        assert!(!session.send(Arc::new(Message::system("dropped"))));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn registry_register_get_unregister() {
        let registry = SessionRegistry::new();
        let (session, _rx) = logged_in(1, "alice");
        registry.register("alice", Arc::clone(&session));

        assert!(registry.is_online("alice"));
        assert_eq!(registry.get("alice").unwrap().id(), 1);
        assert_eq!(registry.all_sessions().len(), 1);

        registry.unregister("alice");
        assert!(!registry.is_online("alice"));
        assert!(registry.get("alice").is_none());
        assert!(registry.is_empty());
    }
}
