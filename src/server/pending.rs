//! Deferred requests resolved by frame presentation.
//!
//! ```text
//! (none) ──wait_frames n──► WaitFrames{n} ──frame × n──► reply, (none)
//! (none) ──screenshot────► Screenshot{1} ──frame──────► reply, (none)
//! any    ──session ends──► dropped, no reply
//! ```
//!
//! A session holds `Option<Pending>`; the `None` state is the absence of a
//! value, so a pending request cannot outlive the session that owns it.

use std::path::PathBuf;

use crate::error::CommandError;
use crate::host::FrameSaver;
use crate::protocol::Reply;

/// A request whose reply waits for future frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// Reply with the frame counter once `remaining` more frames are presented.
    WaitFrames {
        /// Frames still to be presented.
        remaining: u32,
    },
    /// Capture a presented frame once `remaining` reaches zero.
    Screenshot {
        /// Destination file.
        path: PathBuf,
        /// Frames still to be presented before capture.
        remaining: u32,
    },
}

/// Result of advancing a pending request by one frame.
#[derive(Debug, PartialEq)]
pub enum Advance {
    /// Still waiting.
    Waiting(Pending),
    /// Finished; send this reply and end the session.
    Resolved(Reply),
}

impl Pending {
    /// Waits for `frames` presented frames. `frames` must be positive.
    pub fn wait_frames(frames: u32) -> Self {
        Self::WaitFrames { remaining: frames.max(1) }
    }

    /// Captures the next presented frame.
    pub fn screenshot(path: PathBuf) -> Self {
        Self::Screenshot { path, remaining: 1 }
    }

    /// Advances by one presented frame.
    ///
    /// `frame_counter` is the counter value after this frame was counted;
    /// `frame` is the frame just presented, if the host supplied one.
    pub fn advance<S: FrameSaver>(
        self,
        frame_counter: u64,
        frame: Option<&S::Frame>,
        saver: &mut S,
    ) -> Advance {
        match self {
            Self::WaitFrames { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining > 0 {
                    return Advance::Waiting(Self::WaitFrames { remaining });
                }
                Advance::Resolved(Reply::ok().with("frame", frame_counter))
            }
            Self::Screenshot { path, remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining > 0 {
                    return Advance::Waiting(Self::Screenshot { path, remaining });
                }

                let Some(frame) = frame else {
                    return Advance::Resolved(CommandError::NoFrame.into());
                };
                match saver.save_frame(frame, &path) {
                    Ok(()) => Advance::Resolved(
                        Reply::ok().with("path", path.display().to_string()),
                    ),
                    Err(e) => {
                        log::warn!("[remote] Screenshot to {} failed: {e:#}", path.display());
                        Advance::Resolved(CommandError::Capture.into())
                    }
                }
            }
        }
    }
}
