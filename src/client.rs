//! Blocking client for the remote-control socket.
//!
//! Each call opens a fresh connection, writes one request line and reads one
//! reply line; the server closes the connection after replying.
//!
//! ```no_run
//! use remote_control::RemoteClient;
//!
//! let client = RemoteClient::new("/tmp/remote-control.sock");
//! client.ping()?;
//! let frame = client.wait_frames(30)?;
//! println!("now at frame {frame}");
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};

use crate::constants::CLIENT_TIMEOUT;

/// Failure reported by the server in an `ok:false` reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct RemoteError {
    /// The server's `error` string.
    pub reason: String,
}

/// Client for one remote-control socket.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl RemoteClient {
    /// Client for `socket_path` with the default timeout.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: CLIENT_TIMEOUT,
        }
    }

    /// Sets the per-call timeout covering connect-to-reply.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Socket this client connects to.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends one request and returns the reply object.
    ///
    /// # Errors
    ///
    /// Fails if the socket cannot be reached, the reply does not arrive
    /// within the timeout, the reply is not JSON, or the server answers
    /// `ok:false` (as a [`RemoteError`]).
    pub fn call(&self, request: &Value) -> Result<Value> {
        let deadline = Instant::now() + self.timeout;

        let mut stream = UnixStream::connect(&self.socket_path)
            .with_context(|| format!("connect to {}", self.socket_path.display()))?;

        let mut line = request.to_string().into_bytes();
        line.push(b'\n');
        stream.write_all(&line).context("send request")?;

        let raw = read_reply(&mut stream, deadline)?;
        let reply: Value = serde_json::from_slice(&raw)
            .with_context(|| format!("invalid reply: {}", String::from_utf8_lossy(&raw)))?;

        if reply.get("ok").and_then(Value::as_bool) == Some(true) {
            return Ok(reply);
        }
        let reason = reply
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string();
        Err(RemoteError { reason }.into())
    }

    /// Liveness check.
    pub fn ping(&self) -> Result<()> {
        self.call(&json!({"cmd": "ping"})).map(drop)
    }

    /// Full `get_state` reply.
    pub fn state(&self) -> Result<Value> {
        self.call(&json!({"cmd": "get_state"}))
    }

    /// Waits for `frames` presented frames and returns the frame counter.
    ///
    /// A non-positive count returns immediately with no counter, reported
    /// as 0.
    pub fn wait_frames(&self, frames: i64) -> Result<u64> {
        let reply = self.call(&json!({"cmd": "wait_frames", "frames": frames}))?;
        Ok(reply.get("frame").and_then(Value::as_u64).unwrap_or(0))
    }

    /// Captures a frame to `path` (or the server default) and returns the
    /// path the server wrote.
    pub fn screenshot(&self, path: Option<&Path>) -> Result<PathBuf> {
        let mut request = json!({"cmd": "screenshot"});
        if let Some(path) = path {
            request["path"] = Value::String(path.display().to_string());
        }
        let reply = self.call(&request)?;
        reply
            .get("path")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("screenshot reply carried no path"))
    }

    /// Injects `key` with `action` (`tap`, `down` or `up`) `repeat` times.
    pub fn send_key(&self, key: &str, action: &str, repeat: u32) -> Result<()> {
        self.call(&json!({"cmd": "send_key", "key": key, "action": action, "repeat": repeat}))
            .map(drop)
    }

    /// Sends `key` with `action` as `repeat` separate requests.
    ///
    /// When `wait_between` is positive, waits that many frames after every
    /// send, the last one included. A `repeat` of 0 sends nothing.
    pub fn send_key_sequence(&self, key: &str, action: &str, repeat: u32, wait_between: i64) -> Result<()> {
        for _ in 0..repeat {
            self.call(&json!({"cmd": "send_key", "key": key, "action": action}))?;
            if wait_between > 0 {
                self.wait_frames(wait_between)?;
            }
        }
        Ok(())
    }

    /// Taps each key in order, waiting `wait_between` frames after each one.
    pub fn tap_keys<S: AsRef<str>>(&self, keys: &[S], wait_between: i64) -> Result<()> {
        for key in keys {
            self.send_key_sequence(key.as_ref(), "tap", 1, wait_between)?;
        }
        Ok(())
    }

    /// Injects committed text.
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.call(&json!({"cmd": "send_text", "text": text})).map(drop)
    }

    /// Runs a debug console command and returns its last output line.
    pub fn console_exec(&self, command: &str) -> Result<String> {
        let reply = self.call(&json!({"cmd": "console_exec", "command": command}))?;
        Ok(reply
            .get("output")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Asks the host to quit.
    pub fn quit(&self) -> Result<()> {
        self.call(&json!({"cmd": "quit"})).map(drop)
    }
}

/// Reads up to the first newline (or EOF), bounded by `deadline`.
fn read_reply(stream: &mut UnixStream, deadline: Instant) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 512];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            bail!("timed out waiting for reply");
        }
        stream
            .set_read_timeout(Some(remaining))
            .context("set read timeout")?;

        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                    buf.truncate(pos);
                    return Ok(buf);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                bail!("timed out waiting for reply");
            }
            Err(e) => return Err(e).context("read reply"),
        }
    }

    if buf.is_empty() {
        bail!("connection closed without a reply");
    }
    Ok(buf)
}
