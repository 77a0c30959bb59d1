//! Chat commands: MSG (room chat) and PRIVMSG.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use talk_proto::Message;

pub struct MsgHandler;

#[async_trait]
impl Handler for MsgHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let username = ctx.require_login()?.to_string();

        let content = ctx.payload.trim();
        if content.is_empty() {
            return Err(HandlerError::EmptyMessage);
        }

        ctx.dispatcher
            .dispatch(Message::user_chat(username, content));
        Ok(())
    }
}

pub struct PrivMsgHandler;

#[async_trait]
impl Handler for PrivMsgHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let username = ctx.require_login()?.to_string();

        let (recipient, content) = ctx
            .payload
            .trim()
            .split_once(char::is_whitespace)
            .ok_or(HandlerError::Usage("PRIVMSG:<recipient> <message>"))?;
        let content = content.trim();
        if content.is_empty() {
            return Err(HandlerError::EmptyMessage);
        }
        if recipient.eq_ignore_ascii_case(&username) {
            return Err(HandlerError::SelfMessage);
        }

        ctx.dispatcher
            .dispatch(Message::private(username, recipient, content));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Fixture;
    use crate::state::testing::drain;
    use talk_proto::MessageKind;

    #[tokio::test]
    async fn room_chat_reaches_every_member() {
        let fixture = Fixture::new();
        let (alice, mut alice_rx) = fixture.login("alice").await;
        let (bob, mut bob_rx) = fixture.login("bob").await;
        fixture.line(&alice, "CREATE_ROOM:general").await;
        fixture.line(&alice, "JOIN:100").await;
        fixture.line(&bob, "JOIN:100").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        fixture.line(&alice, "MSG:hello room").await;

        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].kind, MessageKind::UserChat);
        assert_eq!(to_bob[0].sender, "alice");
        assert_eq!(to_bob[0].content, "hello room");
        assert_eq!(drain(&mut alice_rx).len(), 1);
    }

    #[tokio::test]
    async fn room_chat_without_a_room_errors_once() {
        let fixture = Fixture::new();
        let (alice, mut rx) = fixture.login("alice").await;

        fixture.line(&alice, "MSG:anyone?").await;

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind, MessageKind::Nok);
        assert!(replies[0].content.contains("not in a room"));
    }

    #[tokio::test]
    async fn empty_room_chat_is_rejected() {
        let fixture = Fixture::new();
        let (alice, mut rx) = fixture.login("alice").await;

        fixture.line(&alice, "MSG:   ").await;

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert!(replies[0].content.contains("empty message"));
    }

    #[tokio::test]
    async fn private_message_reaches_recipient_and_echoes() {
        let fixture = Fixture::new();
        let (alice, mut alice_rx) = fixture.login("alice").await;
        let (_bob, mut bob_rx) = fixture.login("bob").await;

        fixture.line(&alice, "PRIVMSG:bob you around?").await;

        let to_bob = drain(&mut bob_rx);
        assert_eq!(to_bob.len(), 1);
        assert_eq!(to_bob[0].kind, MessageKind::Private);
        assert_eq!(to_bob[0].sender, "alice");
        assert_eq!(to_bob[0].content, "you around?");

        let echo = drain(&mut alice_rx);
        assert_eq!(echo.len(), 1);
        assert_eq!(echo[0].recipient.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn private_message_validation() {
        let fixture = Fixture::new();
        let (alice, mut rx) = fixture.login("alice").await;

        fixture.line(&alice, "PRIVMSG:bob").await;
        fixture.line(&alice, "PRIVMSG:bob   ").await;
        fixture.line(&alice, "PRIVMSG:ALICE hi me").await;

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 3);
        assert!(replies[0].content.contains("Usage: PRIVMSG:"));
        assert!(replies[1].content.contains("Usage: PRIVMSG:"));
        assert!(replies[2].content.contains("to yourself"));
    }

    #[tokio::test]
    async fn messaging_requires_login() {
        let fixture = Fixture::new();
        let (anon, mut rx) = fixture.connect();

        fixture.line(&anon, "MSG:hi").await;
        fixture.line(&anon, "PRIVMSG:bob hi").await;

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 2);
        assert!(replies.iter().all(|r| r.kind == MessageKind::Nok));
        assert!(replies
            .iter()
            .all(|r| r.content.contains("must be logged in")));
    }
}
