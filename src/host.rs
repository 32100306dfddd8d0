//! Collaborator traits implemented by the host application.
//!
//! The server never talks to a windowing library, a console interpreter, or
//! an image encoder directly. It goes through these traits, which the host
//! implements on whatever type already owns that state. [`Host`] bundles
//! them so the two hook calls take a single `&mut host`.

use anyhow::Result;
use std::path::Path;

use crate::keys::Key;

/// Direction of a synthetic key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
}

/// Synthetic input delivery into the host's event queue.
pub trait InputSink {
    /// Queue one key event.
    fn inject_key(&mut self, key: Key, action: KeyAction) -> Result<()>;

    /// Queue one text-input event.
    fn inject_text(&mut self, text: &str) -> Result<()>;

    /// Ask the host to exit at its next opportunity.
    fn request_quit(&mut self);
}

/// The host's in-process debug console.
pub trait DebugConsole {
    /// Run one console command line.
    fn execute(&mut self, command: &str);

    /// Last line the console printed, or an empty string.
    fn last_line(&self) -> String;

    /// Whether the console overlay is currently open.
    fn is_active(&self) -> bool;
}

/// Frame capture.
pub trait FrameSaver {
    /// Frame type handed to [`crate::RemoteServer::on_frame_presented`].
    type Frame;

    /// Save `frame` to `path`.
    fn save_frame(&mut self, frame: &Self::Frame, path: &Path) -> Result<()>;
}

/// Display configuration snapshot reported by `get_state`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Index of the active scaler.
    pub scaler_index: u32,
    /// Human-readable scaler name.
    pub scaler_name: String,
    /// Name of the current scaling mode.
    pub scaling_mode: String,
    /// Display the window is fullscreen on, or `-1` when windowed.
    pub fullscreen_display: i32,
}

/// Read-only display information.
pub trait DisplayInfo {
    /// Current display configuration.
    fn display_state(&self) -> DisplayState;
}

/// Everything the server needs from the host, in one bound.
pub trait Host: InputSink + DebugConsole + FrameSaver + DisplayInfo {}

impl<T: InputSink + DebugConsole + FrameSaver + DisplayInfo> Host for T {}
