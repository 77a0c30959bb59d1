//! Outbound message lines: the immutable `Message` value and its encoding.

use chrono::{DateTime, Utc};
use std::fmt;

/// Sender name used for everything the server itself says.
pub const SERVER_SENDER: &str = "SYSTEM";

/// Routed message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Server/system notifications (events).
    System,
    /// Error response to a client request.
    Error,
    /// Normal chat messages in rooms.
    UserChat,
    /// Private messages between users.
    Private,
    /// Successful response to a client request.
    Ok,
    /// Negative response to a client request.
    Nok,
}

impl MessageKind {
    /// The TYPE field on the wire.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Error => "ERROR",
            Self::UserChat => "USER",
            Self::Private => "PRIVATE",
            Self::Ok => "OK",
            Self::Nok => "NOK",
        }
    }
}

/// One routed message. Constructed fresh for every routed event and never
/// mutated after creation.
///
/// `recipient` is `None` for broadcast and room-scoped messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// How this message is routed and rendered.
    pub kind: MessageKind,
    /// Who said it (`SYSTEM` for the server).
    pub sender: String,
    /// Single addressee, if any.
    pub recipient: Option<String>,
    /// The text body.
    pub content: String,
    /// When the message was constructed.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(
        kind: MessageKind,
        sender: impl Into<String>,
        recipient: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            sender: sender.into(),
            recipient,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// `SYSTEM||<content>`: a server notification with no single recipient.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageKind::System, SERVER_SENDER, None, content)
    }

    /// `ERROR|SYSTEM|<username>|<content>`: an error addressed to one user.
    pub fn error(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, SERVER_SENDER, Some(username.into()), content)
    }

    /// `OK|SYSTEM|<username>|<content>`
    pub fn ok(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(MessageKind::Ok, SERVER_SENDER, Some(username.into()), content)
    }

    /// `NOK|SYSTEM|<username>|<content>`
    pub fn nok(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(MessageKind::Nok, SERVER_SENDER, Some(username.into()), content)
    }

    /// `USER|<from>||<content>`: room chat from a logged-in user.
    pub fn user_chat(from: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(MessageKind::UserChat, from, None, content)
    }

    /// `PRIVATE|<from>|<to>|<content>`
    pub fn private(
        from: impl Into<String>,
        to: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(MessageKind::Private, from, Some(to.into()), content)
    }

    /// Serialize to the pipe-delimited wire form `TYPE|SENDER|RECIPIENT|CONTENT`.
    ///
    /// Line breaks in the content would split the frame, so they are
    /// flattened to spaces.
    pub fn encode(&self) -> String {
        let content: String = self
            .content
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        format!(
            "{}|{}|{}|{}",
            self.kind.as_wire(),
            self.sender,
            self.recipient.as_deref().unwrap_or(""),
            content
        )
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
