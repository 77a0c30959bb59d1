//! Message routing: given a constructed message, decide which sessions
//! receive it and deliver to each.
//!
//! Routing by kind:
//! - `System` fans out to every registered session.
//! - `Ok`, `Nok`, and `Error` are request-scoped responses and go to the
//!   recipient session only.
//! - `UserChat` goes to the sender's current room; a sender with no room
//!   gets told so instead of being silently dropped.
//! - `Private` goes to the recipient and is echoed back to the sender,
//!   unless they are the same session. An unknown recipient produces one
//!   negative response to the sender and nothing else.
//!
//! Delivery is best-effort per recipient; a slow or dead session never
//! blocks the rest.

use crate::state::ServerState;
use std::sync::Arc;
use talk_proto::{Message, MessageKind};
use tracing::{debug, warn};

/// Resolves destination sessions via the session registry and room
/// directory and performs delivery. Stateless beyond the shared registries.
#[derive(Debug)]
pub struct MessageDispatcher {
    state: Arc<ServerState>,
}

impl MessageDispatcher {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Route one message to its destination set.
    pub fn dispatch(&self, message: Message) {
        match message.kind {
            MessageKind::System => self.broadcast_all(message),
            MessageKind::Ok | MessageKind::Nok | MessageKind::Error => {
                self.to_recipient(message);
            }
            MessageKind::UserChat => self.to_room(message),
            MessageKind::Private => self.to_private(message),
        }
    }

    fn broadcast_all(&self, message: Message) {
        let sessions = self.state.sessions.all_sessions();
        let message = Arc::new(message);
        let delivered = sessions
            .iter()
            .filter(|s| s.send(Arc::clone(&message)))
            .count();
        debug!(delivered, total = sessions.len(), "system broadcast");
    }

    fn to_recipient(&self, message: Message) {
        let Some(recipient) = message.recipient.clone() else {
            warn!(kind = message.kind.as_wire(), "response without recipient dropped");
            return;
        };
        match self.state.sessions.get(&recipient) {
            Some(session) => {
                session.send(Arc::new(message));
            }
            None => {
                // recipient may have disconnected between request and reply
                debug!(%recipient, "response recipient not online");
            }
        }
    }

    fn to_room(&self, message: Message) {
        let Some(sender) = self.state.sessions.get(&message.sender) else {
            warn!(sender = %message.sender, "room chat from unknown sender dropped");
            return;
        };
        match sender.current_room() {
            Some(room) => {
                let delivered = room.broadcast(message);
                debug!(room = room.id(), delivered, "room chat delivered");
            }
            None => {
                sender.send(Arc::new(Message::nok(
                    sender.username_or_star(),
                    "You are not in a room. Use JOIN:<room_id> to join one.",
                )));
            }
        }
    }

    fn to_private(&self, message: Message) {
        let Some(recipient_name) = message.recipient.as_deref() else {
            warn!("private message without recipient dropped");
            return;
        };

        match self.state.sessions.get(recipient_name) {
            Some(recipient) => {
                let echo_to_sender = self
                    .state
                    .sessions
                    .get(&message.sender)
                    .filter(|sender| sender.id() != recipient.id());
                let message = Arc::new(message);
                recipient.send(Arc::clone(&message));
                if let Some(sender) = echo_to_sender {
                    sender.send(message);
                }
            }
            None => {
                debug!(recipient = %recipient_name, "private recipient not online");
                if let Some(sender) = self.state.sessions.get(&message.sender) {
                    sender.send(Arc::new(Message::nok(
                        &message.sender,
                        format!("User '{recipient_name}' not found or is offline."),
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{drain, logged_in};

    fn setup() -> (Arc<ServerState>, MessageDispatcher) {
        let state = Arc::new(ServerState::new());
        let dispatcher = MessageDispatcher::new(Arc::clone(&state));
        (state, dispatcher)
    }

    #[test]
    fn system_messages_reach_every_session() {
        let (state, dispatcher) = setup();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        let (bob, mut bob_rx) = logged_in(2, "bob");
        state.sessions.register("alice", alice);
        state.sessions.register("bob", bob);

        dispatcher.dispatch(Message::system("maintenance soon"));

        assert_eq!(drain(&mut alice_rx).len(), 1);
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }

    #[test]
    fn acknowledgements_go_to_the_originator_only() {
        let (state, dispatcher) = setup();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        let (bob, mut bob_rx) = logged_in(2, "bob");
        state.sessions.register("alice", alice);
        state.sessions.register("bob", bob);

        dispatcher.dispatch(Message::ok("alice", "done"));
        dispatcher.dispatch(Message::nok("alice", "nope"));

        assert_eq!(drain(&mut alice_rx).len(), 2);
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[test]
    fn room_chat_reaches_room_members_only() {
        let (state, dispatcher) = setup();
        let room = state.rooms.create_room("general").unwrap();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        let (bob, mut bob_rx) = logged_in(2, "bob");
        let (carol, mut carol_rx) = logged_in(3, "carol");
        state.sessions.register("alice", Arc::clone(&alice));
        state.sessions.register("bob", Arc::clone(&bob));
        state.sessions.register("carol", carol);

        room.add_member(&alice);
        alice.set_room(Arc::clone(&room));
        room.add_member(&bob);
        bob.set_room(Arc::clone(&room));
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        dispatcher.dispatch(Message::user_chat("alice", "hi"));

        let to_alice = drain(&mut alice_rx);
        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].sender, "alice");
        assert!(drain(&mut carol_rx).is_empty());
    }

    #[test]
    fn room_chat_without_a_room_errors_back_to_sender_only() {
        let (state, dispatcher) = setup();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        let (bob, mut bob_rx) = logged_in(2, "bob");
        state.sessions.register("alice", alice);
        state.sessions.register("bob", bob);

        dispatcher.dispatch(Message::user_chat("alice", "hi"));

        let to_alice = drain(&mut alice_rx);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].kind, MessageKind::Nok);
        assert!(to_alice[0].content.contains("not in a room"));
        assert!(drain(&mut bob_rx).is_empty());
    }

    #[test]
    fn private_message_is_delivered_and_echoed() {
        let (state, dispatcher) = setup();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        let (bob, mut bob_rx) = logged_in(2, "bob");
        let (carol, mut carol_rx) = logged_in(3, "carol");
        state.sessions.register("alice", alice);
        state.sessions.register("bob", bob);
        state.sessions.register("carol", carol);

        dispatcher.dispatch(Message::private("alice", "bob", "psst"));

        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].kind, MessageKind::Private);

        let echo = drain(&mut alice_rx);
        assert_eq!(echo.len(), 1);
        assert_eq!(echo[0].content, "psst");

        assert!(drain(&mut carol_rx).is_empty());
    }

    #[test]
    fn private_to_offline_user_yields_one_nok_to_sender() {
        let (state, dispatcher) = setup();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        state.sessions.register("alice", alice);

        dispatcher.dispatch(Message::private("alice", "ghost", "anyone?"));

        let to_alice = drain(&mut alice_rx);
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].kind, MessageKind::Nok);
        assert!(to_alice[0].content.contains("'ghost' not found"));
    }

    #[test]
    fn private_to_own_session_is_not_doubled() {
        let (state, dispatcher) = setup();
        let (alice, mut alice_rx) = logged_in(1, "alice");
        state.sessions.register("alice", alice);

        dispatcher.dispatch(Message::private("alice", "alice", "note to self"));

        assert_eq!(drain(&mut alice_rx).len(), 1);
    }
}
