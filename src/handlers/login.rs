//! LOGIN: bind a unique identity to the calling session.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use std::sync::Arc;
use talk_proto::{Message, REQUEST_FORMAT};
use tracing::info;

/// Usernames are 3 to 15 word characters.
fn is_valid_username(name: &str) -> bool {
    (3..=15).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub struct LoginHandler;

#[async_trait]
impl Handler for LoginHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        if ctx.session.is_logged_in() {
            return Err(HandlerError::AlreadyLoggedIn);
        }

        let username = ctx.payload.trim();
        if !is_valid_username(username) {
            return Err(HandlerError::InvalidUsername);
        }

        // the directory insert is the atomic uniqueness gate; the registry
        // check only catches a name still draining from a disconnect
        if ctx.state.sessions.is_online(username) || !ctx.state.users.register(username) {
            return Err(HandlerError::UsernameTaken(username.to_string()));
        }

        ctx.session.set_username(username);
        ctx.state
            .sessions
            .register(username, Arc::clone(ctx.session));

        info!(session = ctx.session.id(), username, "user logged in");
        ctx.reply(Message::ok(
            username,
            format!(
                "Welcome, {username}! Requests use the format {REQUEST_FORMAT}. Type HELP for commands."
            ),
        ));
        Ok(())
    }
}
