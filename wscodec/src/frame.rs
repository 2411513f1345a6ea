//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::{FrameError, latin1};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Default limit on a single frame payload (1 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

const SENTINEL_END: u8 = 0xFF;
const LENGTH_FLAG: u8 = 0x80;
const CLOSE_TYPE: u8 = 0xFF;
/// A `u64` never needs more than ten 7-bit groups.
const MAX_LENGTH_GROUPS: usize = 10;

/// A draft-75/76 WebSocket frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Sentinel-delimited text frame.
    Text(String),
    /// Length-prefixed frame.
    Binary(Bytes),
    /// Closing handshake, `0xFF 0x00`.
    Close,
}

impl Frame {
    /// Wraps raw bytes in a text frame using the one character per byte mapping.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Frame::Text(latin1::decode(bytes))
    }

    /// Unwraps the frame payload into raw bytes.
    ///
    /// Text payloads are mapped back with [`latin1::encode`]; a close frame
    /// carries nothing.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        match self {
            Frame::Text(text) => Bytes::from(latin1::encode(&text)),
            Frame::Binary(payload) => payload,
            Frame::Close => Bytes::new(),
        }
    }
}

/// Decoder and encoder for [`Frame`]s.
///
/// Decoding is resumable: a partial frame stays in the source buffer until the
/// rest arrives, and several frames in one buffer decode one per call.
#[derive(Clone, Debug)]
pub struct FrameCodec {
    max_frame_len: usize,
    /// Payload bytes of a pending text frame already searched for `0xFF`.
    scanned: usize,
}

impl FrameCodec {
    /// Creates a codec with the default frame size limit.
    #[must_use]
    pub fn new() -> Self {
        FrameCodec::default()
    }

    /// Sets the largest payload accepted.
    #[must_use]
    pub fn with_max_frame_len(mut self, limit: usize) -> Self {
        self.max_frame_len = limit;
        self
    }

    /// Largest payload accepted.
    #[must_use]
    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    fn too_large(&self, length: u64) -> FrameError {
        FrameError::TooLarge {
            length,
            limit: self.max_frame_len,
        }
    }

    fn decode_text(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        let pending = src.len() - 1;
        let start = self.scanned.min(pending);
        match src[1 + start..].iter().position(|&byte| byte == SENTINEL_END) {
            Some(offset) => {
                let end = start + offset;
                self.scanned = 0;
                let frame = src.split_to(end + 2);
                let text = String::from_utf8_lossy(&frame[1..=end]).into_owned();
                trace!("Decoded text frame of {} bytes", end);
                Ok(Some(Frame::Text(text)))
            }
            None => {
                self.scanned = pending;
                if pending > self.max_frame_len {
                    return Err(self.too_large(pending as u64));
                }
                Ok(None)
            }
        }
    }

    fn decode_length_prefixed(&self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        let frame_type = src[0];
        let mut length: u64 = 0;
        let mut index = 1;
        loop {
            let Some(&byte) = src.get(index) else {
                return Ok(None);
            };
            index += 1;
            if index - 1 > MAX_LENGTH_GROUPS {
                return Err(FrameError::LengthOverflow);
            }
            length = length
                .checked_mul(128)
                .and_then(|value| value.checked_add(u64::from(byte & 0x7F)))
                .ok_or(FrameError::LengthOverflow)?;
            if length > self.max_frame_len as u64 {
                return Err(self.too_large(length));
            }
            if byte & LENGTH_FLAG == 0 {
                break;
            }
        }

        if frame_type == CLOSE_TYPE && length == 0 {
            src.advance(index);
            trace!("Decoded closing handshake");
            return Ok(Some(Frame::Close));
        }

        let length = usize::try_from(length).map_err(|_| FrameError::LengthOverflow)?;
        if src.len() < index + length {
            src.reserve(index + length - src.len());
            return Ok(None);
        }
        src.advance(index);
        let payload = src.split_to(length).freeze();
        trace!("Decoded length-prefixed frame of {} bytes", length);
        Ok(Some(Frame::Binary(payload)))
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            scanned: 0,
        }
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, Self::Error> {
        match src.first() {
            None => Ok(None),
            Some(&frame_type) if frame_type & LENGTH_FLAG == 0 => self.decode_text(src),
            Some(_) => self.decode_length_prefixed(src),
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match frame {
            Frame::Text(text) => {
                dst.reserve(text.len() + 2);
                dst.put_u8(0x00);
                dst.put_slice(text.as_bytes());
                dst.put_u8(SENTINEL_END);
            }
            Frame::Binary(payload) => {
                let mut groups = Vec::with_capacity(MAX_LENGTH_GROUPS);
                let mut length = payload.len() as u64;
                loop {
                    // Truncation keeps the low seven bits.
                    #[allow(clippy::cast_possible_truncation)]
                    groups.push((length & 0x7F) as u8);
                    length >>= 7;
                    if length == 0 {
                        break;
                    }
                }
                dst.reserve(1 + groups.len() + payload.len());
                dst.put_u8(LENGTH_FLAG);
                let last = groups.len() - 1;
                for (position, group) in groups.iter().rev().enumerate() {
                    if position == last {
                        dst.put_u8(*group);
                    } else {
                        dst.put_u8(*group | LENGTH_FLAG);
                    }
                }
                dst.put_slice(&payload);
            }
            Frame::Close => dst.put_slice(&[CLOSE_TYPE, 0x00]),
        }
        Ok(())
    }
}
