//! Non-blocking Unix socket listener.
//!
//! Owns the socket file for its lifetime: a stale file at the same path is
//! removed before binding, and the file is removed again on drop.

use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::constants::MAX_SOCKET_PATH;

/// Listening endpoint for remote-control clients.
#[derive(Debug)]
pub struct Listener {
    listener: UnixListener,
    socket_path: PathBuf,
}

impl Listener {
    /// Binds a non-blocking listener at `socket_path`.
    ///
    /// Removes any stale socket file, creates the parent directory, and
    /// restricts the socket to the owner (0600).
    pub fn bind(socket_path: &Path) -> Result<Self> {
        let path_len = socket_path.as_os_str().len();
        if path_len == 0 {
            anyhow::bail!("Socket path is empty");
        }
        if path_len >= MAX_SOCKET_PATH {
            anyhow::bail!(
                "Socket path too long ({path_len} bytes, max {}): {}",
                MAX_SOCKET_PATH - 1,
                socket_path.display()
            );
        }

        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove stale socket: {}", socket_path.display()))?;
        }

        if let Some(parent) = socket_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {}", parent.display()))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind socket: {}", socket_path.display()))?;

        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(socket_path, perms) {
                log::warn!("[remote] Could not restrict {}: {e}", socket_path.display());
            }
        }

        listener
            .set_nonblocking(true)
            .context("Failed to make listener non-blocking")?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts one pending connection without blocking.
    ///
    /// Returns `Ok(None)` when nobody is waiting. Accepted streams are
    /// switched to non-blocking mode.
    pub fn accept(&self) -> io::Result<Option<UnixStream>> {
        loop {
            match self.listener.accept() {
                Ok((stream, _addr)) => {
                    stream.set_nonblocking(true)?;
                    return Ok(Some(stream));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Path of the socket file.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.socket_path) {
            Ok(()) => log::debug!("[remote] Removed socket {}", self.socket_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("[remote] Failed to remove socket {}: {e}", self.socket_path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_replaces_stale_file_and_cleans_up() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sock_path = tmp.path().join("remote.sock");
        std::fs::write(&sock_path, b"stale").unwrap();

        let listener = Listener::bind(&sock_path).unwrap();
        assert!(sock_path.exists());
        assert!(listener.accept().unwrap().is_none(), "nobody connected yet");

        drop(listener);
        assert!(!sock_path.exists(), "socket file should be removed on drop");
    }

    #[test]
    fn test_accept_returns_connected_stream() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sock_path = tmp.path().join("nested/dir/remote.sock");
        let listener = Listener::bind(&sock_path).unwrap();

        let _client = UnixStream::connect(&sock_path).unwrap();
        let accepted = listener.accept().unwrap();
        assert!(accepted.is_some());
    }

    #[test]
    fn test_socket_path_length_validation() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sock_path = tmp.path().join("a".repeat(200)).join("remote.sock");
        let err = Listener::bind(&sock_path).unwrap_err().to_string();
        assert!(err.contains("too long"), "Error should mention path too long: {err}");
    }
}
