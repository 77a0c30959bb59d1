//! Unified error handling for talkd.
//!
//! Every command handler reports failure through [`HandlerError`]; the
//! registry maps non-fatal errors to exactly one negative-acknowledgement
//! line for the originating session, so no error is ever silently swallowed.

use talk_proto::{Message, REQUEST_FORMAT};
use thiserror::Error;

/// Errors that can occur during command handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("username taken: {0}")]
    UsernameTaken(String),

    #[error("invalid username")]
    InvalidUsername,

    #[error("invalid room name")]
    InvalidRoomName,

    #[error("no such room: {0}")]
    NoSuchRoom(String),

    #[error("not in a room")]
    NotInRoom,

    #[error("empty message")]
    EmptyMessage,

    #[error("private message to self")]
    SelfMessage,

    /// Payload did not match the command's expected shape; carries the
    /// usage string to echo back.
    #[error("bad payload: {0}")]
    Usage(&'static str),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Client asked to disconnect. Control flow, not a failure; never
    /// produces a reply.
    #[error("client quit")]
    Quit,
}

impl HandlerError {
    /// Static error code for log field labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "not_logged_in",
            Self::AlreadyLoggedIn => "already_logged_in",
            Self::UsernameTaken(_) => "username_taken",
            Self::InvalidUsername => "invalid_username",
            Self::InvalidRoomName => "invalid_room_name",
            Self::NoSuchRoom(_) => "no_such_room",
            Self::NotInRoom => "not_in_room",
            Self::EmptyMessage => "empty_message",
            Self::SelfMessage => "self_message",
            Self::Usage(_) => "usage",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Quit => "quit",
        }
    }

    /// Convert to the single reply line sent back to the originating
    /// session. Returns `None` for `Quit`, which is handled by the
    /// connection loop instead.
    pub fn to_reply(&self, username: &str) -> Option<Message> {
        let msg = match self {
            Self::NotLoggedIn => Message::nok(username, "You must be logged in to do that."),
            Self::AlreadyLoggedIn => Message::nok(username, "You are already logged in."),
            Self::UsernameTaken(name) => Message::nok(
                username,
                format!("Username '{name}' is already taken."),
            ),
            Self::InvalidUsername => Message::nok(
                username,
                "Invalid username. Use 3-15 alphanumeric characters/underscores.",
            ),
            Self::InvalidRoomName => Message::nok(
                username,
                "Invalid room name. Use 3-20 alphanumeric characters, underscores, or hyphens.",
            ),
            Self::NoSuchRoom(id) => Message::nok(username, format!("Room '{id}' does not exist.")),
            Self::NotInRoom => Message::nok(username, "You are not in a room."),
            Self::EmptyMessage => Message::nok(username, "Cannot send an empty message."),
            Self::SelfMessage => Message::nok(
                username,
                "You cannot send a private message to yourself.",
            ),
            Self::Usage(usage) => Message::nok(username, format!("Usage: {usage}")),
            Self::UnknownCommand(raw) => Message::error(
                username,
                format!("Unknown command: {raw}. Expected format: {REQUEST_FORMAT}"),
            ),
            Self::Quit => return None,
        };
        Some(msg)
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
