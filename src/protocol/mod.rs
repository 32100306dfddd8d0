//! Line protocol spoken over the remote-control socket.
//!
//! One UTF-8 JSON object per `\n`-terminated line in each direction:
//!
//! ```text
//! → {"cmd":"send_key","key":"enter","action":"tap","repeat":2}
//! ← {"ok":true}
//! → {"cmd":"nope"}
//! ← {"ok":false,"error":"unknown cmd"}
//! ```
//!
//! Every reply ends the connection, so a client opens one connection per
//! request. See [`command`] for the recognized commands.

pub mod command;
pub mod fields;
pub mod reply;

pub use command::{Command, KeyMode};
pub use fields::Fields;
pub use reply::Reply;
