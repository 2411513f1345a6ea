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

use super::TelnetOption;
use crate::consts;
use bytes::{BufMut, Bytes, BytesMut};

/// Outbound Telnet frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetFrame {
    /// Application data; `IAC` bytes are doubled on the wire.
    Data(Bytes),
    /// `IAC WILL <option>`
    Will(TelnetOption),
    /// `IAC WONT <option>`
    Wont(TelnetOption),
    /// `IAC DO <option>`
    Do(TelnetOption),
    /// `IAC DONT <option>`
    Dont(TelnetOption),
}

impl TelnetFrame {
    /// Number of bytes this frame occupies on the wire.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TelnetFrame::Data(data) => {
                data.len() + data.iter().filter(|&&b| b == consts::IAC).count()
            }
            TelnetFrame::Will(_)
            | TelnetFrame::Wont(_)
            | TelnetFrame::Do(_)
            | TelnetFrame::Dont(_) => 3,
        }
    }

    /// True for an empty data frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the wire form of this frame to `dst`.
    pub fn write_to(&self, dst: &mut BytesMut) {
        dst.reserve(self.len());
        match self {
            TelnetFrame::Data(data) => {
                for &byte in data {
                    if byte == consts::IAC {
                        dst.put_u8(consts::IAC);
                    }
                    dst.put_u8(byte);
                }
            }
            TelnetFrame::Will(option) => put_negotiation(dst, consts::WILL, *option),
            TelnetFrame::Wont(option) => put_negotiation(dst, consts::WONT, *option),
            TelnetFrame::Do(option) => put_negotiation(dst, consts::DO, *option),
            TelnetFrame::Dont(option) => put_negotiation(dst, consts::DONT, *option),
        }
    }
}

fn put_negotiation(dst: &mut BytesMut, verb: u8, option: TelnetOption) {
    dst.put_slice(&[consts::IAC, verb, option.to_u8()]);
}

impl From<&str> for TelnetFrame {
    fn from(text: &str) -> Self {
        TelnetFrame::Data(Bytes::copy_from_slice(text.as_bytes()))
    }
}
