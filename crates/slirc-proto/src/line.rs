//! Line framing.
//!
//! [`LineFramer`] is the sans-IO framer: feed it raw byte chunks as they come
//! off the socket and it hands back every line completed by that chunk.
//! [`LineCodec`] is the tokio codec used on the write side (and by anything
//! that wants a `Framed` line stream).
//!
//! Lines are terminated by LF; a CR immediately before the LF is stripped.

#[cfg(feature = "tokio")]
use bytes::BytesMut;
#[cfg(feature = "tokio")]
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};

/// Default cap on a single line, in bytes (terminator excluded).
///
/// Far above the classic 512 byte limit so that servers with long
/// `RPL_ISUPPORT` or MOTD lines are never cut off.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Incremental line framer.
///
/// Holds at most one incomplete trailing line between calls to
/// [`feed`](Self::feed), and never more than `max_len` bytes of it plus a
/// trailing CR.
#[derive(Debug)]
pub struct LineFramer {
    buf: Vec<u8>,
    max_len: usize,
    /// Bytes thrown away so far from an overlong line still waiting for its LF.
    discarding: Option<usize>,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Create a framer with [`DEFAULT_MAX_LINE_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a framer with a custom line cap.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_len: max_len.max(1),
            discarding: None,
        }
    }

    /// Maximum accepted line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of bytes buffered for the incomplete trailing line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial line, e.g. after the transport was replaced.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarding = None;
    }

    /// Feed a chunk of bytes and collect every line it completes, in order.
    ///
    /// An overlong line produces a single [`ProtocolError::LineTooLong`] in
    /// its position; the lines around it are unaffected.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<String>> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            let head = &rest[..pos];
            rest = &rest[pos + 1..];

            if let Some(dropped) = self.discarding.take() {
                lines.push(Err(ProtocolError::LineTooLong {
                    actual: dropped + head.len(),
                    limit: self.max_len,
                }));
                continue;
            }

            self.buf.extend_from_slice(head);
            let line = std::mem::take(&mut self.buf);
            lines.push(self.finish(line));
        }

        if !rest.is_empty() {
            match self.discarding.as_mut() {
                Some(dropped) => *dropped += rest.len(),
                None => {
                    self.buf.extend_from_slice(rest);
                    if exceeds_cap(&self.buf, self.max_len) {
                        self.discarding = Some(self.buf.len());
                        self.buf = Vec::new();
                    }
                }
            }
        }

        lines
    }

    fn finish(&self, mut line: Vec<u8>) -> Result<String> {
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.len() > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }
        Ok(decode_lossy(line))
    }
}

/// Whether an unterminated line is already past `max_len`. A single
/// trailing CR is allowed beyond the cap since it may belong to the CRLF.
fn exceeds_cap(partial: &[u8], max_len: usize) -> bool {
    match partial.len().checked_sub(max_len) {
        None | Some(0) => false,
        Some(1) => partial.last() != Some(&b'\r'),
        Some(_) => true,
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences.
///
/// Plenty of networks still carry latin-1 text; a stray byte should cost a
/// replacement character, not the whole line.
fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Truncate an outgoing line at its first CR or LF.
///
/// Anything after an embedded line ending would otherwise reach the server
/// as a second command.
pub fn sanitize(line: &str) -> &str {
    match line.find(['\r', '\n']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Line-based codec for tokio.
///
/// Decodes LF-terminated lines (CR stripped) and encodes lines with a
/// trailing CRLF after [`sanitize`]-ing them.
#[cfg(feature = "tokio")]
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

#[cfg(feature = "tokio")]
impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "tokio")]
impl LineCodec {
    /// Create a codec with [`DEFAULT_MAX_LINE_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom line cap.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: max_len.max(1),
        }
    }
}

#[cfg(feature = "tokio")]
impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            let mut line = line[..line.len() - 1].to_vec();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }
            Ok(Some(decode_lossy(line)))
        } else {
            self.next_index = src.len();

            if exceeds_cap(&src[..], self.max_len) {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }
}

#[cfg(feature = "tokio")]
impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        let line = sanitize(&line);
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
