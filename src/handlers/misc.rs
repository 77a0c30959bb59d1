//! QUIT, HELP, and the fallback for unrecognized input.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use talk_proto::{KNOWN_KINDS, Message};

pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, _ctx: &Context<'_>) -> HandlerResult {
        Err(HandlerError::Quit)
    }
}

pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let listing = KNOWN_KINDS
            .iter()
            .map(|kind| format!("{} - {}", kind.keyword(), kind.description()))
            .collect::<Vec<_>>()
            .join("; ");
        ctx.reply(Message::ok(
            ctx.session.username_or_star(),
            format!("Available commands: {listing}"),
        ));
        Ok(())
    }
}

pub struct UnknownHandler;

#[async_trait]
impl Handler for UnknownHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        // payload carries the raw line for Unknown
        Err(HandlerError::UnknownCommand(ctx.payload.to_string()))
    }
}
