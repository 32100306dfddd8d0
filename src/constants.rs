//! Application-wide constants for the remote-control server.
//!
//! # Categories
//!
//! - **Paths**: default socket and screenshot locations
//! - **Limits**: buffer sizes and label lengths
//! - **Polling**: accept throttling and client timeouts

use std::time::Duration;

// ============================================================================
// Paths
// ============================================================================

/// Default Unix socket path when the host does not configure one.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/remote-control.sock";

/// Default destination for `screenshot` requests without a `path` field.
pub const DEFAULT_SCREENSHOT_PATH: &str = "/tmp/remote-control.bmp";

/// Maximum socket path length in bytes.
///
/// `sun_path` is 104 bytes on macOS and 108 on Linux; the smaller limit is
/// used on every platform.
pub const MAX_SOCKET_PATH: usize = 104;

// ============================================================================
// Limits
// ============================================================================

/// Per-session receive buffer capacity.
///
/// A request line (including its newline) must fit; a client that fills the
/// buffer without sending a newline gets an `overflow` error and is dropped.
pub const RX_BUFFER_CAPACITY: usize = 4096;

/// Size of a single non-blocking `read` during [`crate::RemoteServer::pump`].
pub const READ_CHUNK_SIZE: usize = 512;

/// Maximum length in bytes of the UI context label reported by `get_state`.
pub const MAX_UI_CONTEXT_LEN: usize = 63;

/// UI context label reported before the host sets one.
pub const DEFAULT_UI_CONTEXT: &str = "unknown";

// ============================================================================
// Polling
// ============================================================================

/// Minimum delay between accept attempts while no session is active.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(8);

/// Default client-side timeout for one request/reply exchange.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
