//! The single live client connection.
//!
//! A `Session` owns the stream, its receive buffer, and its pending request.
//! Dropping it closes the connection and discards all three together.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;

use super::line_buffer::{Fed, LineBuffer};
use super::pending::Pending;
use crate::protocol::Reply;

/// Outcome of one non-blocking read.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReadStatus {
    /// These lines arrived (possibly none) along with an overflow flag.
    Data(Fed),
    /// Nothing available right now.
    Idle,
    /// Peer closed the connection or the socket failed.
    Closed,
}

/// One accepted client connection.
#[derive(Debug)]
pub(crate) struct Session {
    stream: UnixStream,
    rx: LineBuffer,
    pub(crate) pending: Option<Pending>,
}

impl Session {
    pub(crate) fn new(stream: UnixStream, rx_capacity: usize) -> Self {
        Self {
            stream,
            rx: LineBuffer::new(rx_capacity.max(1)),
            pending: None,
        }
    }

    /// Reads one chunk into `scratch` and frames it.
    pub(crate) fn read(&mut self, scratch: &mut [u8]) -> ReadStatus {
        loop {
            match self.stream.read(scratch) {
                Ok(0) => return ReadStatus::Closed,
                Ok(n) => return ReadStatus::Data(self.rx.feed(&scratch[..n])),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return ReadStatus::Idle,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    log::debug!("[remote] Read error: {e}");
                    return ReadStatus::Closed;
                }
            }
        }
    }

    /// Writes one reply line.
    ///
    /// Replies are small enough for the socket buffer; a full buffer is
    /// reported as an error rather than waited on.
    pub(crate) fn send(&mut self, reply: &Reply) -> io::Result<()> {
        let mut line = reply.to_line().into_bytes();
        line.push(b'\n');
        self.stream.write_all(&line)
    }
}
