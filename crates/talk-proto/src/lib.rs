//! # talk-proto
//!
//! Wire grammar for the talkd chat protocol.
//!
//! The protocol is line-oriented text in both directions:
//!
//! - Inbound command lines: `COMMAND:payload` (relaxed) or
//!   `REQ|COMMAND|payload` (strict). Command keywords are case-insensitive.
//! - Outbound message lines: `TYPE|SENDER|RECIPIENT|CONTENT`, pipe-joined,
//!   with an empty RECIPIENT field when the message has no single recipient.
//!
//! This crate knows nothing about sessions, rooms, or routing; it only
//! parses and encodes lines.

#![warn(missing_docs)]

pub mod command;
pub mod message;

pub use command::{CommandKind, KNOWN_KINDS, ParsedCommand, REQUEST_FORMAT};
pub use message::{Message, MessageKind, SERVER_SENDER};
