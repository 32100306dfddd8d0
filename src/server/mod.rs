//! Remote-control server driven from the host's own loop.
//!
//! # Purpose
//!
//! Lets a harness connected to a Unix socket drive the host application
//! while the host keeps its single-threaded, frame-paced loop. The server
//! never blocks and never spawns anything; it does bounded work inside two
//! hook calls.
//!
//! # Architecture
//!
//! ```text
//! host loop iteration
//!   ├─ server.pump(&mut host)
//!   │    ├─ no session: throttled non-blocking accept
//!   │    └─ session:    read until WouldBlock
//!   │                    └─ LineBuffer → lines → dispatch::execute
//!   │                         ├─ Outcome::Reply  → write, end session
//!   │                         └─ Outcome::Defer  → session.pending = Some(..)
//!   ├─ render + present
//!   └─ server.on_frame_presented(&mut host, Some(&frame))
//!        └─ frame_counter += 1, pending.advance(..)
//!             └─ Advance::Resolved → write, end session
//! ```
//!
//! # Protocol contract
//!
//! - One connection at a time; others wait in the listen backlog.
//! - One reply per connection, after which the server closes it. The
//!   exception is `busy`: a request that arrives while a deferred one is
//!   outstanding is answered with `busy` and the connection stays open for
//!   the deferred reply.
//! - Closing the connection drops any pending request without a reply.

mod dispatch;
pub mod line_buffer;
pub mod pending;
mod session;
pub mod transport;

use std::path::Path;
use std::rc::{Rc, Weak};
use std::time::Instant;

use anyhow::{anyhow, Result};

use crate::config::Config;
use crate::constants::{DEFAULT_UI_CONTEXT, MAX_UI_CONTEXT_LEN, READ_CHUNK_SIZE};
use crate::error::CommandError;
use crate::host::Host;
use crate::protocol::Reply;
use dispatch::{Context, Outcome};
use pending::Advance;
use session::{ReadStatus, Session};
use transport::Listener;

/// Lifecycle of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not enabled; every hook is a no-op.
    Disabled,
    /// Enabled but [`RemoteServer::initialize`] has not run yet.
    Enabled,
    /// Bound and accepting connections.
    Listening,
    /// Initialization failed; disabled for the rest of the process.
    Failed,
}

/// Embedded remote-control server.
///
/// `F` is the host's frame type. The server only keeps a [`Weak`] handle to
/// the most recently presented frame and never extends its lifetime.
#[derive(Debug)]
pub struct RemoteServer<F> {
    config: Config,
    status: Status,
    listener: Option<Listener>,
    session: Option<Session>,
    next_accept: Option<Instant>,
    frame_counter: u64,
    last_frame: Weak<F>,
    ui_context: String,
}

impl<F> RemoteServer<F> {
    /// Creates a server from `config`. Nothing is bound until
    /// [`initialize`](Self::initialize).
    pub fn new(config: Config) -> Self {
        let status = if config.enabled { Status::Enabled } else { Status::Disabled };
        Self {
            config,
            status,
            listener: None,
            session: None,
            next_accept: None,
            frame_counter: 0,
            last_frame: Weak::new(),
            ui_context: DEFAULT_UI_CONTEXT.to_string(),
        }
    }

    /// Enables the server, optionally overriding the socket path.
    ///
    /// Only configuration; takes effect at [`initialize`](Self::initialize).
    /// An empty path keeps the configured one.
    pub fn enable(&mut self, socket_path: Option<&Path>) {
        match self.status {
            Status::Listening => {
                log::warn!("[remote] enable() after initialization ignored");
                return;
            }
            Status::Failed => {
                log::warn!("[remote] enable() ignored: server failed to initialize earlier");
                return;
            }
            Status::Disabled | Status::Enabled => {}
        }

        if let Some(path) = socket_path.filter(|p| !p.as_os_str().is_empty()) {
            self.config.socket_path = path.to_path_buf();
        }
        self.config.enabled = true;
        self.status = Status::Enabled;
    }

    /// Binds the listening socket.
    ///
    /// Succeeds without doing anything when the server is disabled or
    /// already listening. On failure the error is logged and returned, and
    /// the server stays disabled for the rest of the process.
    pub fn initialize(&mut self) -> Result<()> {
        match self.status {
            Status::Disabled | Status::Listening => return Ok(()),
            Status::Failed => {
                return Err(anyhow!("remote control disabled after an earlier initialization failure"));
            }
            Status::Enabled => {}
        }

        match Listener::bind(&self.config.socket_path) {
            Ok(listener) => {
                log::info!("[remote] Listening on {}", listener.socket_path().display());
                self.listener = Some(listener);
                self.status = Status::Listening;
                self.next_accept = None;
                Ok(())
            }
            Err(e) => {
                log::error!("[remote] Disabled: {e:#}");
                self.status = Status::Failed;
                Err(e)
            }
        }
    }

    /// Closes any session and the listener, and removes the socket file.
    pub fn shutdown(&mut self) {
        if self.session.take().is_some() {
            log::debug!("[remote] Dropped active session on shutdown");
        }
        if let Some(listener) = self.listener.take() {
            log::info!("[remote] Shutting down {}", listener.socket_path().display());
        }
        if self.status == Status::Listening {
            self.status = Status::Enabled;
        }
    }

    /// Sets the free-text label reported as `context` by `get_state`.
    ///
    /// Empty labels reset to `"unknown"`; long labels are truncated.
    pub fn set_ui_context(&mut self, label: &str) {
        if label.is_empty() {
            self.ui_context = DEFAULT_UI_CONTEXT.to_string();
            return;
        }
        let mut end = label.len().min(MAX_UI_CONTEXT_LEN);
        while !label.is_char_boundary(end) {
            end -= 1;
        }
        self.ui_context = label[..end].to_string();
    }

    /// Current UI context label.
    pub fn ui_context(&self) -> &str {
        &self.ui_context
    }

    /// Lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the server is enabled and has not failed.
    pub fn is_enabled(&self) -> bool {
        matches!(self.status, Status::Enabled | Status::Listening)
    }

    /// Whether the listening socket is bound.
    pub fn is_listening(&self) -> bool {
        self.status == Status::Listening
    }

    /// Configured socket path.
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Frames presented since initialization.
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Whether a client is connected.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the connected client is waiting on a deferred reply.
    pub fn has_pending(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.pending.is_some())
    }

    /// Non-blocking service call; invoke once per host loop iteration.
    pub fn pump<H: Host<Frame = F>>(&mut self, host: &mut H) {
        if self.status != Status::Listening {
            return;
        }

        if self.session.is_none() {
            self.poll_accept();
        }
        self.read_session(host);
    }

    /// Frame hook; invoke once per presented frame, after presenting.
    ///
    /// `frame` is the frame just presented, or `None` if the host has none
    /// to offer for capture.
    pub fn on_frame_presented<H: Host<Frame = F>>(&mut self, host: &mut H, frame: Option<&Rc<F>>) {
        if self.status != Status::Listening {
            return;
        }

        self.frame_counter += 1;
        self.last_frame = frame.map(Rc::downgrade).unwrap_or_default();

        let Some(session) = self.session.as_mut() else { return };
        let Some(pending) = session.pending.take() else { return };

        match pending.advance(self.frame_counter, frame.map(|f| &**f), host) {
            Advance::Waiting(next) => session.pending = Some(next),
            Advance::Resolved(reply) => self.finish(&reply),
        }
    }

    fn poll_accept(&mut self) {
        let Some(listener) = self.listener.as_ref() else { return };

        let now = Instant::now();
        if self.next_accept.is_some_and(|next| now < next) {
            return;
        }

        match listener.accept() {
            Ok(Some(stream)) => {
                log::debug!("[remote] Client connected");
                self.session = Some(Session::new(stream, self.config.rx_capacity));
                // The next poll after this session ends happens immediately.
                self.next_accept = None;
            }
            Ok(None) => self.next_accept = Some(now + self.config.accept_interval()),
            Err(e) => {
                log::warn!("[remote] Accept error: {e}");
                self.next_accept = Some(now + self.config.accept_interval());
            }
        }
    }

    fn read_session<H: Host<Frame = F>>(&mut self, host: &mut H) {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        while let Some(session) = self.session.as_mut() {
            let fed = match session.read(&mut chunk) {
                ReadStatus::Data(fed) => fed,
                ReadStatus::Idle => return,
                ReadStatus::Closed => {
                    self.end_session("client disconnected");
                    return;
                }
            };

            for line in fed.lines {
                self.handle_line(host, &line);
                if self.session.is_none() {
                    return;
                }
            }

            if fed.overflow {
                log::warn!("[remote] Request exceeded {} bytes", self.config.rx_capacity);
                self.finish(&CommandError::Overflow.into());
                return;
            }
        }
    }

    fn handle_line<H: Host<Frame = F>>(&mut self, host: &mut H, bytes: &[u8]) {
        let Some(session) = self.session.as_mut() else { return };

        if session.pending.is_some() {
            if let Err(e) = session.send(&CommandError::Busy.into()) {
                log::debug!("[remote] Busy reply failed: {e}");
                self.end_session("write failed");
            }
            return;
        }

        let line = match std::str::from_utf8(bytes) {
            Ok(line) if !line.contains('\0') => line,
            _ => {
                self.finish(&CommandError::Malformed.into());
                return;
            }
        };

        let outcome = {
            let ctx = Context {
                frame_counter: self.frame_counter,
                ui_context: &self.ui_context,
                last_frame: &self.last_frame,
                screenshot_path: &self.config.screenshot_path,
            };
            dispatch::execute(line, &ctx, host)
        };

        match outcome {
            Outcome::Reply(reply) => self.finish(&reply),
            Outcome::Defer(pending) => {
                if let Some(session) = self.session.as_mut() {
                    log::debug!("[remote] Deferred: {pending:?}");
                    session.pending = Some(pending);
                }
            }
        }
    }

    /// Writes the session's one reply and closes it.
    fn finish(&mut self, reply: &Reply) {
        let Some(mut session) = self.session.take() else { return };
        if let Err(e) = session.send(reply) {
            log::debug!("[remote] Reply not delivered: {e}");
        }
    }

    fn end_session(&mut self, reason: &str) {
        if let Some(session) = self.session.take() {
            if session.pending.is_some() {
                log::debug!("[remote] Session ended ({reason}); pending request discarded");
            } else {
                log::debug!("[remote] Session ended ({reason})");
            }
        }
    }
}
