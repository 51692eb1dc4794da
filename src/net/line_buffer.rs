//! net/line_buffer.rs
//!
//! Byte buffers sitting between a raw stream and newline-delimited text.
//! The inbox accumulates whatever the socket hands us and pops complete lines;
//! `frame_line` lays out an outgoing message with its terminator.

use bytes::{BufMut, BytesMut};
use std::io;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const LF: u8 = b'\n';
const CR: u8 = b'\r';

// -----------------------------------------------------------------------------
// ----- LineBuffer ------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct LineBuffer {
    buf: BytesMut,
    reserve: usize,
}

impl LineBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let reserve = capacity.max(1);

        Self {
            buf: BytesMut::with_capacity(reserve),
            reserve,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- LineBuffer: Public Methods --------------------------------------------

impl LineBuffer {
    /// Space for the next socket read. Grows by the configured reserve.
    #[inline]
    pub(crate) fn read_target(&mut self) -> &mut BytesMut {
        self.buf.reserve(self.reserve);
        &mut self.buf
    }

    /// Pop the next complete line, without its `\n` (or `\r\n`).
    ///
    /// The line is consumed even when it fails to decode.
    pub(crate) fn next_line(&mut self) -> Option<io::Result<String>> {
        let idx = memchr::memchr(LF, &self.buf)?;

        let mut line = self.buf.split_to(idx + 1);
        line.truncate(idx);
        if line.last() == Some(&CR) {
            line.truncate(idx - 1);
        }

        Some(decode(line))
    }

    /// Drain an unterminated tail left behind at end-of-stream.
    pub(crate) fn take_remainder(&mut self) -> Option<io::Result<String>> {
        if self.buf.is_empty() {
            return None;
        }

        Some(decode(self.buf.split()))
    }
}

// -----------------------------------------------------------------------------
// ----- LineBuffer: Test Helpers ----------------------------------------------

impl LineBuffer {
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

// -----------------------------------------------------------------------------
// ----- Outbound --------------------------------------------------------------

/// Append `message` plus a single `\n` to `out`.
///
/// Embedded newlines are written as-is; the peer sees several lines.
pub(crate) fn frame_line(out: &mut BytesMut, message: &str) {
    out.reserve(message.len() + 1);
    out.extend_from_slice(message.as_bytes());
    out.put_u8(LF);
}

// -----------------------------------------------------------------------------
// ----- Internal: Helpers -----------------------------------------------------

fn decode(line: BytesMut) -> io::Result<String> {
    String::from_utf8(line.to_vec()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fed(bytes: &[u8]) -> LineBuffer {
        let mut buf = LineBuffer::with_capacity(16);
        buf.read_target().extend_from_slice(bytes);
        buf
    }

    fn ok(res: Option<io::Result<String>>) -> String {
        res.expect("line present").expect("valid utf-8")
    }

    #[test]
    fn waits_for_terminator() {
        let mut buf = fed(b"partial");
        assert!(buf.next_line().is_none());

        buf.read_target().extend_from_slice(b" line\nnext");
        assert_eq!(ok(buf.next_line()), "partial line");
        assert!(buf.next_line().is_none());
        assert!(!buf.is_empty());
    }

    #[test]
    fn pops_lines_in_stream_order() {
        let mut buf = fed(b"one\ntwo\n\nthree\n");
        assert_eq!(ok(buf.next_line()), "one");
        assert_eq!(ok(buf.next_line()), "two");
        assert_eq!(ok(buf.next_line()), "");
        assert_eq!(ok(buf.next_line()), "three");
        assert!(buf.next_line().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn strips_carriage_return_before_newline_only() {
        let mut buf = fed(b"crlf\r\nlone\rcr\n\r\n");
        assert_eq!(ok(buf.next_line()), "crlf");
        assert_eq!(ok(buf.next_line()), "lone\rcr");
        assert_eq!(ok(buf.next_line()), "");
    }

    #[test]
    fn invalid_utf8_is_reported_and_consumed() {
        let mut buf = fed(b"\xff\xfe\nfine\n");
        let err = buf.next_line().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(ok(buf.next_line()), "fine");
    }

    #[test]
    fn multibyte_text_survives() {
        let mut buf = fed("héllo wörld 🦀\n".as_bytes());
        assert_eq!(ok(buf.next_line()), "héllo wörld 🦀");
    }

    #[test]
    fn remainder_only_when_non_empty() {
        let mut buf = fed(b"done\ntail");
        assert_eq!(ok(buf.next_line()), "done");
        assert_eq!(ok(buf.take_remainder()), "tail");
        assert!(buf.take_remainder().is_none());
    }

    #[test]
    fn frame_line_appends_single_terminator() {
        let mut out = BytesMut::new();
        frame_line(&mut out, "hello");
        assert_eq!(&out[..], b"hello\n");

        out.clear();
        frame_line(&mut out, "a\nb");
        assert_eq!(&out[..], b"a\nb\n");

        out.clear();
        frame_line(&mut out, "");
        assert_eq!(&out[..], b"\n");
    }

    #[test]
    fn frame_line_keeps_unwritten_bytes() {
        let mut out = BytesMut::from(&b"tail of earlier line\n"[..]);
        frame_line(&mut out, "next");
        assert_eq!(&out[..], b"tail of earlier line\nnext\n");
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
