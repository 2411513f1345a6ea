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

use super::{CodecError, TelnetEvent, TelnetFrame, TelnetOption, TelnetVerb, consts};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

/// Default upper bound on a single subnegotiation payload.
pub const DEFAULT_MAX_SUBNEGOTIATION: usize = 8 * 1024;

/// A codec that separates Telnet application data from `IAC` control sequences.
///
/// `TelnetCodec` keeps no option state. Negotiation requests are reported as
/// [`TelnetEvent::Negotiate`] and it is up to the caller whether to answer them.
///
/// The decoder never consumes a partial control sequence: if `src` ends in the
/// middle of one, the bytes stay in `src` and `Ok(None)` is returned, so the
/// sequence is completed by whatever the next read appends.
#[derive(Clone, Debug)]
pub struct TelnetCodec {
    max_subnegotiation: usize,
}

impl TelnetCodec {
    /// Creates a new instance of `TelnetCodec`.
    ///
    /// # Example
    /// ```
    /// use lantern_telnetcodec::TelnetCodec;
    ///
    /// let codec = TelnetCodec::new();
    /// ```
    #[must_use]
    pub fn new() -> TelnetCodec {
        TelnetCodec::default()
    }

    /// Sets the largest subnegotiation payload accepted before the decoder fails.
    #[must_use]
    pub fn with_max_subnegotiation(mut self, limit: usize) -> Self {
        self.max_subnegotiation = limit;
        self
    }

    /// Largest subnegotiation payload accepted.
    #[must_use]
    pub fn max_subnegotiation(&self) -> usize {
        self.max_subnegotiation
    }

    /// Scans an `IAC SB` block at the start of `src` without consuming it.
    fn scan_subnegotiation(&self, src: &[u8]) -> Result<Scan, CodecError> {
        let Some(&option) = src.get(2) else {
            return Ok(Scan::Incomplete);
        };
        let mut payload = BytesMut::new();
        let mut index = 3;
        while index < src.len() {
            let byte = src[index];
            if byte == consts::IAC {
                let Some(&next) = src.get(index + 1) else {
                    break;
                };
                match next {
                    consts::IAC => {
                        payload.put_u8(consts::IAC);
                        index += 2;
                    }
                    consts::SE => {
                        return Ok(Scan::Complete(
                            index + 2,
                            TelnetEvent::Subnegotiate {
                                option: TelnetOption::from_u8(option),
                                payload: payload.freeze(),
                            },
                        ));
                    }
                    other => {
                        warn!(
                            "Subnegotiation for option {} aborted by command 0x{:02X}",
                            option, other
                        );
                        return Ok(Scan::Aborted(index));
                    }
                }
            } else {
                payload.put_u8(byte);
                index += 1;
            }
            if payload.len() > self.max_subnegotiation {
                return Err(CodecError::SubnegotiationOverflow {
                    option,
                    limit: self.max_subnegotiation,
                });
            }
        }
        Ok(Scan::Incomplete)
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        TelnetCodec {
            max_subnegotiation: DEFAULT_MAX_SUBNEGOTIATION,
        }
    }
}

/// Outcome of scanning a subnegotiation block.
enum Scan {
    /// `IAC SE` not seen yet.
    Incomplete,
    /// Block complete; holds the number of bytes it spans.
    Complete(usize, TelnetEvent),
    /// Block broken off by another command at the given offset.
    Aborted(usize),
}

impl Decoder for TelnetCodec {
    type Item = TelnetEvent;
    type Error = CodecError;

    /// Decodes the next complete unit from `src`.
    ///
    /// - A run of bytes up to the next `IAC` is returned as one [`TelnetEvent::Data`].
    /// - `IAC IAC` is returned as a single `0xFF` data byte.
    /// - `IAC GA` is returned as [`TelnetEvent::GoAhead`].
    /// - `IAC WILL|WONT|DO|DONT <opt>` is returned as [`TelnetEvent::Negotiate`].
    /// - `IAC SB <opt> ... IAC SE` is returned as [`TelnetEvent::Subnegotiate`].
    /// - Any other `IAC <cmd>` is returned as [`TelnetEvent::Command`].
    ///
    /// # Errors
    /// Returns [`CodecError::SubnegotiationOverflow`] when a subnegotiation block
    /// exceeds the configured limit.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<TelnetEvent>, Self::Error> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }
            if src[0] != consts::IAC {
                let end = src
                    .iter()
                    .position(|&byte| byte == consts::IAC)
                    .unwrap_or(src.len());
                return Ok(Some(TelnetEvent::Data(src.split_to(end).freeze())));
            }
            let Some(&command) = src.get(1) else {
                return Ok(None);
            };
            if let Some(verb) = TelnetVerb::from_u8(command) {
                let Some(&option) = src.get(2) else {
                    return Ok(None);
                };
                src.advance(3);
                let option = TelnetOption::from_u8(option);
                trace!("Received {} {}", verb, option);
                return Ok(Some(TelnetEvent::Negotiate(verb, option)));
            }
            match command {
                consts::IAC => {
                    src.advance(2);
                    return Ok(Some(TelnetEvent::Data(Bytes::from_static(&[consts::IAC]))));
                }
                consts::GA => {
                    src.advance(2);
                    return Ok(Some(TelnetEvent::GoAhead));
                }
                consts::SB => match self.scan_subnegotiation(src)? {
                    Scan::Incomplete => return Ok(None),
                    Scan::Complete(len, event) => {
                        src.advance(len);
                        return Ok(Some(event));
                    }
                    Scan::Aborted(len) => {
                        src.advance(len);
                    }
                },
                other => {
                    src.advance(2);
                    trace!("Received command 0x{:02X}", other);
                    return Ok(Some(TelnetEvent::Command(other)));
                }
            }
        }
    }
}

impl Encoder<TelnetFrame> for TelnetCodec {
    type Error = CodecError;

    fn encode(&mut self, frame: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        frame.write_to(dst);
        Ok(())
    }
}
