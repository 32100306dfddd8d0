//! Newline framing for one session's receive stream.
//!
//! Bytes arrive in arbitrary fragments (down to one byte per read). The
//! buffer holds at most `capacity` bytes; a complete line, newline included,
//! must fit. Filling the buffer without a newline is an overflow and the
//! buffered partial line is never handed out.

/// Lines extracted by one [`LineBuffer::feed`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Fed {
    /// Complete non-empty lines, newline stripped, in arrival order.
    pub lines: Vec<Vec<u8>>,
    /// The buffer filled up before a newline appeared.
    pub overflow: bool,
}

/// Bounded accumulator that splits a byte stream on `\n`.
#[derive(Debug)]
pub struct LineBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl LineBuffer {
    /// Creates an empty buffer holding at most `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LineBuffer capacity must be > 0");
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `bytes` and returns every line completed by them.
    ///
    /// Lines completed before an overflow are still returned. After an
    /// overflow the remaining input is dropped and the caller is expected to
    /// end the session.
    pub fn feed(&mut self, mut bytes: &[u8]) -> Fed {
        let mut fed = Fed::default();

        while !bytes.is_empty() {
            let room = self.capacity - self.buf.len();
            let take = room.min(bytes.len());
            self.buf.extend_from_slice(&bytes[..take]);
            bytes = &bytes[take..];

            self.drain_lines(&mut fed.lines);

            if self.buf.len() >= self.capacity {
                fed.overflow = true;
                self.buf.clear();
                break;
            }
        }

        fed
    }

    /// Moves every complete line out of the buffer, shifting the remainder left.
    fn drain_lines(&mut self, lines: &mut Vec<Vec<u8>>) {
        let mut start = 0;
        while let Some(pos) = self.buf[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            if end > start {
                lines.push(self.buf[start..end].to_vec());
            }
            start = end + 1;
        }
        if start > 0 {
            self.buf.drain(..start);
        }
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut buf = LineBuffer::new(64);
        let fed = buf.feed(b"{\"cmd\":\"ping\"}\n");
        assert_eq!(fed.lines, vec![b"{\"cmd\":\"ping\"}".to_vec()]);
        assert!(!fed.overflow);
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn test_byte_by_byte_fragments() {
        let mut buf = LineBuffer::new(64);
        let message = b"{\"cmd\":\"get_state\"}\n";
        let mut lines = Vec::new();
        for byte in message {
            lines.extend(buf.feed(std::slice::from_ref(byte)).lines);
        }
        assert_eq!(lines, vec![b"{\"cmd\":\"get_state\"}".to_vec()]);
    }

    #[test]
    fn test_multiple_lines_and_remainder() {
        let mut buf = LineBuffer::new(64);
        let fed = buf.feed(b"one\ntwo\r\nthr");
        assert_eq!(fed.lines, vec![b"one".to_vec(), b"two\r".to_vec()]);
        assert_eq!(buf.pending_len(), 3);

        let fed = buf.feed(b"ee\n");
        assert_eq!(fed.lines, vec![b"three".to_vec()]);
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let mut buf = LineBuffer::new(16);
        let fed = buf.feed(b"\n\nx\n\n");
        assert_eq!(fed.lines, vec![b"x".to_vec()]);
    }

    #[test]
    fn test_line_exactly_filling_capacity_fits() {
        let mut buf = LineBuffer::new(8);
        let fed = buf.feed(b"1234567\n");
        assert_eq!(fed.lines, vec![b"1234567".to_vec()]);
        assert!(!fed.overflow);
    }

    #[test]
    fn test_overflow_without_newline() {
        let mut buf = LineBuffer::new(8);
        let fed = buf.feed(b"12345678");
        assert!(fed.overflow);
        assert!(fed.lines.is_empty());
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn test_overflow_across_feeds() {
        let mut buf = LineBuffer::new(8);
        assert!(!buf.feed(b"1234").overflow);
        assert!(buf.feed(b"5678").overflow);
    }

    #[test]
    fn test_lines_before_overflow_are_kept() {
        let mut buf = LineBuffer::new(8);
        let fed = buf.feed(b"ok\n0123456789abcdef");
        assert_eq!(fed.lines, vec![b"ok".to_vec()]);
        assert!(fed.overflow);
    }

    #[test]
    fn test_large_input_with_frequent_newlines_never_overflows() {
        let mut buf = LineBuffer::new(8);
        let input = b"ab\n".repeat(100);
        let fed = buf.feed(&input);
        assert_eq!(fed.lines.len(), 100);
        assert!(!fed.overflow);
    }
}
