//! Remote control - embedded automation channel for interactive applications.
//!
//! This crate lets an external test harness drive a running, frame-paced
//! application over a local Unix socket: inject input, run debug console
//! commands, capture screenshots, and synchronize on presented frames.
//!
//! # Architecture
//!
//! ```text
//! Host loop (single thread)                   Harness process
//! ┌───────────────────────────┐              ┌──────────────────┐
//! │ server.pump(&mut host)    │◄── line ─────│ RemoteClient     │
//! │   accept / read / dispatch│              │  (or remotectl)  │
//! │ render frame              │              │                  │
//! │ server.on_frame_presented │── reply ────►│                  │
//! │   advance pending request │              └──────────────────┘
//! └───────────────────────────┘
//! ```
//!
//! Nothing here spawns a thread or blocks. Requests whose answer depends on
//! a future frame (`wait_frames`, `screenshot`) are parked as a pending
//! request and resolved from [`RemoteServer::on_frame_presented`].
//!
//! # Modules
//!
//! - [`server`] - listening socket, session, dispatcher, pending requests
//! - [`protocol`] - request field extraction, commands, reply lines
//! - [`host`] - collaborator traits the host application implements
//! - [`keys`] - key names accepted by `send_key`
//! - [`client`] - blocking client used by harnesses and `remotectl`
//! - [`mcp`] - MCP stdio bridge exposing the client as tools
//! - [`config`] - configuration and environment overrides

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod keys;
pub mod mcp;
pub mod protocol;
pub mod server;

pub use client::{RemoteClient, RemoteError};
pub use config::Config;
pub use error::CommandError;
pub use host::{DebugConsole, DisplayInfo, DisplayState, FrameSaver, Host, InputSink, KeyAction};
pub use keys::Key;
pub use mcp::McpBridge;
pub use server::{RemoteServer, Status};
