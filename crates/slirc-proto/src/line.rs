//! Line-based codec for tokio.
//!
//! Reads CRLF (or bare LF) terminated frames and writes frames with CRLF
//! appended. Frames are decoded as UTF-8, with invalid sequences replaced,
//! since a client cannot refuse what a server sends.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::CodecError;

/// Maximum frame length accepted by default: 8191 bytes of tags plus a
/// 512-byte message.
pub const DEFAULT_MAX_LEN: usize = 8191 + 512;

/// Line-based codec that handles newline-terminated frames.
///
/// Decoded frames have their terminator removed. A frame longer than the
/// limit is discarded up to its terminator rather than failing the stream.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Skipping the rest of an overlong frame
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default length limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Create a codec with a custom length limit (terminator included).
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    fn frame_from(bytes: &[u8]) -> String {
        let trimmed = match bytes {
            [rest @ .., b'\r', b'\n'] | [rest @ .., b'\n'] | [rest @ .., b'\r'] => rest,
            rest => rest,
        };
        String::from_utf8_lossy(trimmed).into_owned()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        loop {
            // Look for newline starting from where we left off
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding {
                    src.clear();
                    self.next_index = 0;
                } else if src.len() > self.max_len {
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                    tracing::warn!(limit = self.max_len, "discarding overlong line");
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                tracing::warn!(len = line.len(), limit = self.max_len, "discarding overlong line");
                continue;
            }

            return Ok(Some(Self::frame_from(&line)));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() || self.discarding {
            src.clear();
            return Ok(None);
        }
        let rest = src.split_to(src.len());
        self.next_index = 0;
        Ok(Some(Self::frame_from(&rest)))
    }
}

impl Encoder<String> for LineCodec {
    type Error = CodecError;

    fn encode(&mut self, frame: String, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.reserve(frame.len() + 2);
        dst.put_slice(frame.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
