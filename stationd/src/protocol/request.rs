/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Request-line accumulation and parsing.
//!
//! A connection carries exactly one request.  Bytes are pushed into a
//! [`LineBuffer`] until the CR-LF terminator shows up; the buffer starts at
//! `min` bytes and doubles on demand up to `max`.  A line that would not fit
//! in `max` bytes (terminator included) is abandoned with
//! [`Feed::TooLarge`].

use super::error::ProtocolError;

const METHOD_PREFIX: &[u8] = b"GET ";
const VERSION_MARKER: &[u8] = b" HTTP/1.1";

// ── Line buffer ───────────────────────────────────────────────────────────────

/// Receive-buffer bounds, bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self { min: 64, max: 256 }
    }
}

/// Result of pushing bytes into a [`LineBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// No terminator yet.
    NeedMore,
    /// A complete line, terminator stripped.
    Line(Vec<u8>),
    /// The line outgrew `max`; the buffered bytes were discarded.
    TooLarge,
}

#[derive(Debug)]
pub struct LineBuffer {
    buf: Vec<u8>,
    capacity: usize,
    limits: BufferLimits,
}

impl LineBuffer {
    pub fn new(limits: BufferLimits) -> Self {
        let min = limits.min.max(2).min(limits.max);
        Self {
            buf: Vec::with_capacity(min),
            capacity: min,
            limits,
        }
    }

    /// Current logical capacity (grows by doubling, never above `max`).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends `chunk`.  Bytes after the first terminator are ignored.
    pub fn push(&mut self, chunk: &[u8]) -> Feed {
        for &byte in chunk {
            if self.buf.len() >= self.capacity {
                if self.capacity >= self.limits.max {
                    self.buf.clear();
                    return Feed::TooLarge;
                }
                self.capacity = (self.capacity * 2).min(self.limits.max);
                self.buf.reserve_exact(self.capacity - self.buf.len());
            }

            self.buf.push(byte);
            if byte == b'\n' && self.buf.ends_with(b"\r\n") {
                self.buf.truncate(self.buf.len() - 2);
                return Feed::Line(std::mem::take(&mut self.buf));
            }
        }
        Feed::NeedMore
    }
}

// ── Request line ──────────────────────────────────────────────────────────────

/// Extracts the raw path bytes from `GET <path> HTTP/1.1`.
pub fn parse_request_line(line: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let rest = line
        .strip_prefix(METHOD_PREFIX)
        .ok_or_else(|| ProtocolError::BadRequest("only GET is supported".into()))?;

    let end = rest
        .windows(VERSION_MARKER.len())
        .position(|w| w == VERSION_MARKER)
        .ok_or_else(|| ProtocolError::BadRequest("missing HTTP/1.1 marker".into()))?;

    Ok(rest[..end].to_vec())
}

// ── Query string ──────────────────────────────────────────────────────────────

/// Decodes `%XX` escapes into raw bytes.
///
/// A `%` not followed by two hex digits is copied through unchanged together
/// with whatever follows it.  `+` is not treated as a space.  The result is
/// not required to be UTF-8.
pub fn percent_decode(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    let mut i = 0;
    while i < value.len() {
        if value[i] == b'%' && i + 2 < value.len() {
            if let (Some(hi), Some(lo)) = (hex_value(value[i + 1]), hex_value(value[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(value[i]);
        i += 1;
    }
    out
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Splits `k1=v1&k2=v2` into pairs, percent-decoding each value.
///
/// Empty tokens are skipped; a token without `=` yields an empty value.
pub fn parse_query(query: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
    query
        .split(|&b| b == b'&')
        .filter(|token| !token.is_empty())
        .map(|token| match token.iter().position(|&b| b == b'=') {
            Some(eq) => (token[..eq].to_vec(), percent_decode(&token[eq + 1..])),
            None => (token.to_vec(), Vec::new()),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── LineBuffer ────────────────────────────────────────────────────────────

    #[test]
    fn line_is_returned_without_terminator() {
        let mut lb = LineBuffer::new(BufferLimits::default());
        assert_eq!(lb.push(b"GET /get/ntp HTTP/1.1"), Feed::NeedMore);
        assert_eq!(
            lb.push(b"\r\nHost: x\r\n"),
            Feed::Line(b"GET /get/ntp HTTP/1.1".to_vec())
        );
    }

    #[test]
    fn terminator_split_across_chunks_is_found() {
        let mut lb = LineBuffer::new(BufferLimits::default());
        assert_eq!(lb.push(b"abc\r"), Feed::NeedMore);
        assert_eq!(lb.push(b"\n"), Feed::Line(b"abc".to_vec()));
    }

    #[test]
    fn bare_newline_is_not_a_terminator() {
        let mut lb = LineBuffer::new(BufferLimits::default());
        assert_eq!(lb.push(b"abc\ndef"), Feed::NeedMore);
    }

    #[test]
    fn buffer_doubles_up_to_max() {
        let mut lb = LineBuffer::new(BufferLimits { min: 4, max: 20 });
        assert_eq!(lb.capacity(), 4);
        lb.push(b"12345");
        assert_eq!(lb.capacity(), 8);
        lb.push(b"6789");
        assert_eq!(lb.capacity(), 16);
        lb.push(b"abcdefgh");
        assert_eq!(lb.capacity(), 20);
        assert_eq!(lb.len(), 17);
    }

    #[test]
    fn line_of_exactly_max_bytes_fits() {
        let mut lb = LineBuffer::new(BufferLimits { min: 4, max: 8 });
        assert_eq!(lb.push(b"123456\r\n"), Feed::Line(b"123456".to_vec()));
    }

    #[test]
    fn many_small_chunks_past_max_are_too_large() {
        let mut lb = LineBuffer::new(BufferLimits { min: 8, max: 32 });
        let mut outcome = Feed::NeedMore;
        for _ in 0..20 {
            outcome = lb.push(b"ab");
            if outcome != Feed::NeedMore {
                break;
            }
        }
        assert_eq!(outcome, Feed::TooLarge);
        assert!(lb.is_empty(), "contents must be abandoned");
    }

    // ── parse_request_line ────────────────────────────────────────────────────

    #[test]
    fn request_line_yields_path() {
        assert_eq!(
            parse_request_line(b"GET /set/lcd?msg=hi HTTP/1.1").unwrap(),
            b"/set/lcd?msg=hi"
        );
    }

    #[test]
    fn request_path_keeps_non_utf8_bytes() {
        assert_eq!(
            parse_request_line(b"GET /set/lcd?msg=\xe9\xe9 HTTP/1.1").unwrap(),
            b"/set/lcd?msg=\xe9\xe9"
        );
    }

    #[test]
    fn non_get_or_missing_version_is_bad_request() {
        for line in [
            &b"POST /get/lcd HTTP/1.1"[..],
            b"get /get/lcd HTTP/1.1",
            b"GET /get/lcd HTTP/1.0",
            b"GET /get/lcd",
            b"",
        ] {
            assert!(
                matches!(parse_request_line(line), Err(ProtocolError::BadRequest(_))),
                "{:?}",
                String::from_utf8_lossy(line)
            );
        }
    }

    // ── percent_decode ────────────────────────────────────────────────────────

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(percent_decode(b"Hello%20World%21"), b"Hello World!");
        assert_eq!(percent_decode(b"%3a%3A"), b"::");
        assert_eq!(percent_decode(b"a+b"), b"a+b");
    }

    #[test]
    fn escapes_decode_to_raw_bytes() {
        assert_eq!(percent_decode(b"%E9%e9%FF%00"), vec![0xE9, 0xE9, 0xFF, 0x00]);
        assert_eq!(percent_decode(b"caf%E9"), b"caf\xe9");
    }

    #[test]
    fn incomplete_escapes_pass_through() {
        assert_eq!(percent_decode(b"100%"), b"100%");
        assert_eq!(percent_decode(b"%4"), b"%4");
        assert_eq!(percent_decode(b"%zz1"), b"%zz1");
        assert_eq!(percent_decode(b"%4g"), b"%4g");
    }

    // ── parse_query ───────────────────────────────────────────────────────────

    #[test]
    fn query_pairs_are_split_on_first_equals() {
        assert_eq!(
            parse_query(b"msg=a%3Db&r=1&&flag"),
            vec![
                (b"msg".to_vec(), b"a=b".to_vec()),
                (b"r".to_vec(), b"1".to_vec()),
                (b"flag".to_vec(), Vec::new()),
            ]
        );
        assert_eq!(parse_query(b"k=x=y"), vec![(b"k".to_vec(), b"x=y".to_vec())]);
    }
}
