//! Failure reasons reported to remote clients.
//!
//! Each variant's `Display` text is exactly what goes into the
//! `"error"` field of an `{"ok":false,...}` reply.

use thiserror::Error;

/// A request that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A new request arrived while a deferred one is outstanding.
    #[error("busy")]
    Busy,
    /// The session buffer filled up before a newline arrived.
    #[error("overflow")]
    Overflow,
    /// The line was not UTF-8 or contained NUL bytes.
    #[error("malformed message")]
    Malformed,
    /// A required field is absent or has the wrong type.
    #[error("missing {0}")]
    MissingField(&'static str),
    /// The `cmd` field names no known command.
    #[error("unknown cmd")]
    UnknownCommand,
    /// `send_key` named a key this server does not know.
    #[error("unknown key")]
    UnknownKey,
    /// The host refused a key event.
    #[error("failed to push key event")]
    KeyInjection,
    /// The host refused a text event.
    #[error("failed to push text event")]
    TextInjection,
    /// Screenshot resolution found no presented frame.
    #[error("no frame available")]
    NoFrame,
    /// The host could not save the frame.
    #[error("screenshot failed")]
    Capture,
}
