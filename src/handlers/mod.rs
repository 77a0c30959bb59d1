//! Command handler registry and dispatch.
//!
//! Each inbound line is parsed into a `ParsedCommand` and dispatched to one
//! handler. The kind→handler mapping is immutable after startup; any error a
//! handler returns is turned into exactly one reply line to the originating
//! session.

mod login;
mod messaging;
mod misc;
mod room;

use crate::dispatch::MessageDispatcher;
use crate::error::{HandlerError, HandlerResult};
use crate::state::{ServerState, Session};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use talk_proto::{CommandKind, Message, ParsedCommand};
use tracing::{Instrument, Level, debug, span};

pub use login::LoginHandler;
pub use messaging::{MsgHandler, PrivMsgHandler};
pub use misc::{HelpHandler, QuitHandler, UnknownHandler};
pub use room::{CreateRoomHandler, JoinHandler, LeaveHandler, ListRoomsHandler, WhoHandler};

/// Everything a handler may touch: the shared registries, the dispatcher,
/// the calling session, and the command payload.
pub struct Context<'a> {
    pub state: &'a Arc<ServerState>,
    pub dispatcher: &'a MessageDispatcher,
    pub session: &'a Arc<Session>,
    pub payload: &'a str,
}

impl Context<'_> {
    /// The caller's identity, or `NotLoggedIn`.
    pub fn require_login(&self) -> Result<&str, HandlerError> {
        self.session.username().ok_or(HandlerError::NotLoggedIn)
    }

    /// Queue a reply directly on the calling session, bypassing the
    /// dispatcher.
    pub fn reply(&self, message: Message) {
        self.session.send(Arc::new(message));
    }
}

/// One executable command.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult;
}

/// What the connection loop should do after a dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Keep reading.
    Continue,
    /// Client asked to disconnect.
    Quit,
}

/// Registry of command handlers. Built once at startup, immutable after.
pub struct Registry {
    handlers: HashMap<CommandKind, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<CommandKind, Box<dyn Handler>> = HashMap::new();

        handlers.insert(CommandKind::Login, Box::new(LoginHandler));

        // Room handlers
        handlers.insert(CommandKind::CreateRoom, Box::new(CreateRoomHandler));
        handlers.insert(CommandKind::Join, Box::new(JoinHandler));
        handlers.insert(CommandKind::Leave, Box::new(LeaveHandler));
        handlers.insert(CommandKind::ListRooms, Box::new(ListRoomsHandler));
        handlers.insert(CommandKind::Who, Box::new(WhoHandler));

        // Messaging handlers
        handlers.insert(CommandKind::Msg, Box::new(MsgHandler));
        handlers.insert(CommandKind::PrivMsg, Box::new(PrivMsgHandler));

        // Misc handlers
        handlers.insert(CommandKind::Quit, Box::new(QuitHandler));
        handlers.insert(CommandKind::Help, Box::new(HelpHandler));
        handlers.insert(CommandKind::Unknown, Box::new(UnknownHandler));

        Self { handlers }
    }

    /// Parse one raw line and run its handler.
    ///
    /// Blank lines are ignored. Handler errors other than `Quit` are
    /// converted to a single reply to the calling session here, so callers
    /// only see the continue/quit decision.
    pub async fn dispatch(
        &self,
        state: &Arc<ServerState>,
        dispatcher: &MessageDispatcher,
        session: &Arc<Session>,
        raw: &str,
    ) -> DispatchOutcome {
        let Some(parsed) = ParsedCommand::parse(raw) else {
            return DispatchOutcome::Continue;
        };
        let ParsedCommand { kind, payload } = parsed;

        let ctx = Context {
            state,
            dispatcher,
            session,
            payload: &payload,
        };

        let cmd_span = span!(
            Level::DEBUG,
            "command",
            kind = %kind,
            session = session.id(),
            username = session.username_or_star(),
        );

        let result = async {
            match self.handlers.get(&kind) {
                Some(handler) => handler.handle(&ctx).await,
                // every kind including Unknown is registered; treat a gap
                // like unrecognized input
                None => Err(HandlerError::UnknownCommand(raw.to_string())),
            }
        }
        .instrument(cmd_span)
        .await;

        match result {
            Ok(()) => DispatchOutcome::Continue,
            Err(HandlerError::Quit) => DispatchOutcome::Quit,
            Err(error) => {
                debug!(
                    kind = %kind,
                    session = session.id(),
                    code = error.error_code(),
                    %error,
                    "command failed"
                );
                if let Some(reply) = error.to_reply(session.username_or_star()) {
                    ctx.reply(reply);
                }
                DispatchOutcome::Continue
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
