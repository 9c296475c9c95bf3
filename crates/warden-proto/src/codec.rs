//! Newline-delimited JSON codec for tokio.
//!
//! Each frame is one JSON document followed by `\n`. Blank lines are skipped.
//! Framing failures (oversized or non-UTF-8 lines) end the stream; a line
//! that is well framed but not a valid frame is yielded as an `Err` item so
//! the reader can log it and keep going.

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum frame length (a READY for a large guild is big).
pub const DEFAULT_MAX_FRAME: usize = 8 * 1024 * 1024;

/// Codec decoding `In` frames and encoding `Out` frames.
pub struct FrameCodec<In, Out> {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    _marker: PhantomData<fn(Out) -> In>,
}

impl<In, Out> FrameCodec<In, Out> {
    /// Create a codec with the default frame limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_FRAME)
    }

    /// Create a codec with a custom frame limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            _marker: PhantomData,
        }
    }
}

impl<In, Out> Default for FrameCodec<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned, Out> Decoder for FrameCodec<In, Out> {
    type Item = Result<In, serde_json::Error>;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Self::Item>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                self.next_index = src.len();
                if src.len() > self.max_len {
                    return Err(ProtocolError::FrameTooLong {
                        actual: src.len(),
                        limit: self.max_len,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::FrameTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let text = std::str::from_utf8(&line).map_err(|e| ProtocolError::InvalidUtf8 {
                valid_up_to: e.valid_up_to(),
            })?;
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            return Ok(Some(serde_json::from_str(text)));
        }
    }
}

impl<In, Out: Serialize> Encoder<Out> for FrameCodec<In, Out> {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Out, dst: &mut BytesMut) -> error::Result<()> {
        let json = serde_json::to_vec(&frame)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.extend_from_slice(b"\n");
        Ok(())
    }
}
