//! Turns one request line into one effect and one reply (now or later).

use std::path::{Path, PathBuf};
use std::rc::Weak;

use super::pending::Pending;
use crate::error::CommandError;
use crate::host::{DebugConsole, DisplayInfo, FrameSaver, Host, InputSink, KeyAction};
use crate::keys::Key;
use crate::protocol::{Command, KeyMode, Reply};

/// What the server should do after executing a command.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    /// Send this reply and end the session.
    Reply(Reply),
    /// Keep the session open and park this request.
    Defer(Pending),
}

impl From<CommandError> for Outcome {
    fn from(err: CommandError) -> Self {
        Self::Reply(err.into())
    }
}

/// Server state visible to commands.
#[derive(Debug)]
pub(crate) struct Context<'a, F> {
    pub frame_counter: u64,
    pub ui_context: &'a str,
    pub last_frame: &'a Weak<F>,
    pub screenshot_path: &'a Path,
}

/// Parses and executes one request line.
pub(crate) fn execute<H: Host>(line: &str, ctx: &Context<'_, H::Frame>, host: &mut H) -> Outcome {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => {
            log::debug!("[remote] Rejected request: {e}");
            return e.into();
        }
    };
    log::debug!("[remote] Command: {}", command.name());

    match command {
        Command::Ping => Outcome::Reply(Reply::ok().with("pong", true)),
        Command::GetState => Outcome::Reply(state_reply(ctx, host)),
        Command::SendKey { key, mode, repeat } => send_key(host, key, mode, repeat),
        Command::SendText { text } => match host.inject_text(&text) {
            Ok(()) => Outcome::Reply(Reply::ok()),
            Err(e) => {
                log::warn!("[remote] Text injection failed: {e:#}");
                CommandError::TextInjection.into()
            }
        },
        Command::ConsoleExec { command } => {
            DebugConsole::execute(host, &command);
            Outcome::Reply(Reply::ok().with("output", host.last_line()))
        }
        Command::WaitFrames { frames } if frames <= 0 => Outcome::Reply(Reply::ok()),
        Command::WaitFrames { frames } => {
            let frames = u32::try_from(frames).unwrap_or(u32::MAX);
            Outcome::Defer(Pending::wait_frames(frames))
        }
        Command::Screenshot { path } => {
            let path = path.unwrap_or_else(|| ctx.screenshot_path.to_path_buf());
            screenshot(ctx, host, path)
        }
        Command::Quit => {
            host.request_quit();
            Outcome::Reply(Reply::ok())
        }
    }
}

fn state_reply<F, H: DebugConsole + DisplayInfo>(ctx: &Context<'_, F>, host: &H) -> Reply {
    let display = host.display_state();
    Reply::ok()
        .with("frame", ctx.frame_counter)
        .with("context", ctx.ui_context)
        .with("console_active", host.is_active())
        .with("scaler_index", display.scaler_index)
        .with("scaler_name", display.scaler_name)
        .with("scaling_mode", display.scaling_mode)
        .with("fullscreen_display", display.fullscreen_display)
}

fn send_key<H: InputSink>(host: &mut H, key: Key, mode: KeyMode, repeat: u32) -> Outcome {
    let actions: &[KeyAction] = match mode {
        KeyMode::Down => &[KeyAction::Down],
        KeyMode::Up => &[KeyAction::Up],
        KeyMode::Tap => &[KeyAction::Down, KeyAction::Up],
    };

    // Keep going after a failure so a tap never leaves a key stuck down.
    let mut all_pushed = true;
    for _ in 0..repeat {
        for &action in actions {
            if let Err(e) = host.inject_key(key, action) {
                log::warn!("[remote] Key injection failed for {key}: {e:#}");
                all_pushed = false;
            }
        }
    }

    if all_pushed {
        Outcome::Reply(Reply::ok())
    } else {
        CommandError::KeyInjection.into()
    }
}

fn screenshot<H: FrameSaver>(
    ctx: &Context<'_, H::Frame>,
    host: &mut H,
    path: PathBuf,
) -> Outcome {
    if let Some(frame) = ctx.last_frame.upgrade() {
        match host.save_frame(&frame, &path) {
            Ok(()) => {
                return Outcome::Reply(Reply::ok().with("path", path.display().to_string()));
            }
            Err(e) => {
                log::warn!(
                    "[remote] Immediate screenshot to {} failed, retrying on next frame: {e:#}",
                    path.display()
                );
            }
        }
    }
    Outcome::Defer(Pending::screenshot(path))
}
