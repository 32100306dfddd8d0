//! Typed view of a request line.

use std::path::PathBuf;

use super::fields::Fields;
use crate::error::CommandError;
use crate::keys::Key;

/// How `send_key` presses the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Key-down only.
    Down,
    /// Key-up only.
    Up,
    /// Down followed by up.
    Tap,
}

impl KeyMode {
    /// Parses the `action` field. Unrecognized values act as a tap.
    pub fn from_action(action: Option<&str>) -> Self {
        match action {
            Some("down") => Self::Down,
            Some("up") => Self::Up,
            _ => Self::Tap,
        }
    }
}

/// A recognized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Liveness check.
    Ping,
    /// Snapshot of frame counter, UI context, console and display state.
    GetState,
    /// Inject `repeat` key presses.
    SendKey {
        /// Resolved key.
        key: Key,
        /// Down, up, or both.
        mode: KeyMode,
        /// Number of repetitions, at least 1.
        repeat: u32,
    },
    /// Inject one text-input event.
    SendText {
        /// Text to type.
        text: String,
    },
    /// Run a debug console command.
    ConsoleExec {
        /// Console command line.
        command: String,
    },
    /// Reply after this many presented frames. Zero or less replies at once.
    WaitFrames {
        /// Requested frame count as sent by the client.
        frames: i64,
    },
    /// Save a frame to `path`, or to the configured default.
    Screenshot {
        /// Destination requested by the client.
        path: Option<PathBuf>,
    },
    /// Ask the host to exit.
    Quit,
}

impl Command {
    /// Parses one request line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let fields = Fields::parse(line);
        let name = fields.string("cmd").ok_or(CommandError::MissingField("cmd"))?;

        let command = match name.as_str() {
            "ping" => Self::Ping,
            "get_state" => Self::GetState,
            "send_key" => {
                let key_name = fields.string("key").ok_or(CommandError::MissingField("key"))?;
                let key = Key::from_name(&key_name).ok_or(CommandError::UnknownKey)?;
                let mode = KeyMode::from_action(fields.string("action").as_deref());
                let repeat = fields.int("repeat").unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
                Self::SendKey { key, mode, repeat }
            }
            "send_text" => Self::SendText {
                text: fields.string("text").ok_or(CommandError::MissingField("text"))?,
            },
            "console_exec" => Self::ConsoleExec {
                command: fields.string("command").ok_or(CommandError::MissingField("command"))?,
            },
            "wait_frames" => Self::WaitFrames {
                frames: fields.int("frames").unwrap_or(1),
            },
            "screenshot" => Self::Screenshot {
                path: fields.string("path").filter(|p| !p.is_empty()).map(PathBuf::from),
            },
            "quit" => Self::Quit,
            _ => return Err(CommandError::UnknownCommand),
        };
        Ok(command)
    }

    /// Wire name of this command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::GetState => "get_state",
            Self::SendKey { .. } => "send_key",
            Self::SendText { .. } => "send_text",
            Self::ConsoleExec { .. } => "console_exec",
            Self::WaitFrames { .. } => "wait_frames",
            Self::Screenshot { .. } => "screenshot",
            Self::Quit => "quit",
        }
    }
}
