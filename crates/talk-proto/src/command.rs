//! Inbound command lines: kinds, descriptions, and parsing.

use std::fmt;

/// The strict request format accepted by the server.
///
/// Relaxed `COMMAND:payload` lines are accepted as well; error responses
/// name this form because it is the one clients are told to use.
pub const REQUEST_FORMAT: &str = "REQ|COMMAND|payload";

/// Every command kind a client can send.
///
/// `Unknown` is the fallback for unrecognized keywords and malformed
/// strict-form lines; it never appears in help output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Log in with a username.
    Login,
    /// List available chat rooms.
    ListRooms,
    /// Create a new chat room.
    CreateRoom,
    /// Join a chat room by id.
    Join,
    /// Leave the current chat room.
    Leave,
    /// List users in the current chat room.
    Who,
    /// Send a message to the current room.
    Msg,
    /// Send a private message to a user.
    PrivMsg,
    /// Disconnect from the server.
    Quit,
    /// Show available commands.
    Help,
    /// Unrecognized or malformed input.
    Unknown,
}

/// All kinds a client can ask for, in help-output order. Excludes `Unknown`.
pub const KNOWN_KINDS: [CommandKind; 10] = [
    CommandKind::Login,
    CommandKind::ListRooms,
    CommandKind::CreateRoom,
    CommandKind::Join,
    CommandKind::Leave,
    CommandKind::Who,
    CommandKind::Msg,
    CommandKind::PrivMsg,
    CommandKind::Quit,
    CommandKind::Help,
];

impl CommandKind {
    /// The wire keyword for this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::ListRooms => "LIST_ROOMS",
            Self::CreateRoom => "CREATE_ROOM",
            Self::Join => "JOIN",
            Self::Leave => "LEAVE",
            Self::Who => "WHO",
            Self::Msg => "MSG",
            Self::PrivMsg => "PRIVMSG",
            Self::Quit => "QUIT",
            Self::Help => "HELP",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// One-line description, shown by HELP.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Login => "Log in with a username",
            Self::ListRooms => "List available chat rooms",
            Self::CreateRoom => "Create a new chat room",
            Self::Join => "Join a chat room by id",
            Self::Leave => "Leave the current chat room",
            Self::Who => "List users in the current chat room",
            Self::Msg => "Send a message to the current room",
            Self::PrivMsg => "Send a private message to a user",
            Self::Quit => "Disconnect from the server",
            Self::Help => "Show available commands",
            Self::Unknown => "Unknown or unsupported command",
        }
    }

    /// Resolve a raw keyword, case-insensitively. Unrecognized keywords
    /// resolve to `Unknown`.
    pub fn from_keyword(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LOGIN" => Self::Login,
            "LIST_ROOMS" => Self::ListRooms,
            "CREATE_ROOM" => Self::CreateRoom,
            "JOIN" => Self::Join,
            "LEAVE" => Self::Leave,
            "WHO" => Self::Who,
            "MSG" => Self::Msg,
            "PRIVMSG" => Self::PrivMsg,
            "QUIT" => Self::Quit,
            "HELP" => Self::Help,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One parsed command line: a kind plus its trimmed payload.
///
/// For `Unknown`, `payload` carries the original line so the fallback
/// handler can echo what was not understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// What the client asked for.
    pub kind: CommandKind,
    /// Everything after the keyword, trimmed.
    pub payload: String,
}

impl ParsedCommand {
    /// Parse one raw input line.
    ///
    /// Returns `None` for blank lines. Lines carrying the strict `REQ|`
    /// prefix must have the shape `REQ|COMMAND|payload`; a malformed strict
    /// line degrades to `Unknown` rather than being guessed at. Everything
    /// else is treated as the relaxed `COMMAND:payload` form, where a line
    /// with no colon is a bare keyword with an empty payload.
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(rest) = strip_req_prefix(line) {
            let (keyword, payload) = match rest.split_once('|') {
                Some((k, p)) => (k, p.trim()),
                None => (rest, ""),
            };
            if keyword.trim().is_empty() {
                return Some(Self::unknown(line));
            }
            let kind = CommandKind::from_keyword(keyword);
            if kind == CommandKind::Unknown {
                return Some(Self::unknown(line));
            }
            return Some(Self {
                kind,
                payload: payload.to_string(),
            });
        }

        let (keyword, payload) = match line.split_once(':') {
            Some((k, p)) => (k, p.trim()),
            None => (line, ""),
        };
        let kind = CommandKind::from_keyword(keyword);
        if kind == CommandKind::Unknown {
            return Some(Self::unknown(line));
        }
        Some(Self {
            kind,
            payload: payload.to_string(),
        })
    }

    fn unknown(line: &str) -> Self {
        Self {
            kind: CommandKind::Unknown,
            payload: line.to_string(),
        }
    }
}

/// Strip a case-insensitive `REQ|` prefix, returning the remainder.
fn strip_req_prefix(line: &str) -> Option<&str> {
    let (head, rest) = line.split_at_checked(4)?;
    head.eq_ignore_ascii_case("REQ|").then_some(rest)
}
