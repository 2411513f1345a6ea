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
use bytes::Bytes;

/// Negotiation verb carried by [`TelnetEvent::Negotiate`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetVerb {
    /// `IAC WILL`
    Will,
    /// `IAC WONT`
    Wont,
    /// `IAC DO`
    Do,
    /// `IAC DONT`
    Dont,
}

impl TelnetVerb {
    /// Maps a command byte to its verb, if it is one of the four negotiation commands.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(TelnetVerb::Will),
            consts::WONT => Some(TelnetVerb::Wont),
            consts::DO => Some(TelnetVerb::Do),
            consts::DONT => Some(TelnetVerb::Dont),
            _ => None,
        }
    }

    /// Wire byte of this verb.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            TelnetVerb::Will => consts::WILL,
            TelnetVerb::Wont => consts::WONT,
            TelnetVerb::Do => consts::DO,
            TelnetVerb::Dont => consts::DONT,
        }
    }
}

impl std::fmt::Display for TelnetVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetVerb::Will => write!(f, "WILL"),
            TelnetVerb::Wont => write!(f, "WONT"),
            TelnetVerb::Do => write!(f, "DO"),
            TelnetVerb::Dont => write!(f, "DONT"),
        }
    }
}

///
/// `TelnetEvent` is what the decoder yields for each complete unit of input.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelnetEvent {
    /// A run of application bytes with any `IAC IAC` escape already collapsed.
    Data(Bytes),
    /// End of input for half-duplex connections.
    GoAhead,
    /// Option negotiation request from the peer.
    Negotiate(TelnetVerb, TelnetOption),
    /// Subnegotiation block, payload unescaped.
    Subnegotiate {
        /// Option the block belongs to
        option: TelnetOption,
        /// Payload between the option byte and `IAC SE`
        payload: Bytes,
    },
    /// Any other two byte command (`NOP`, `AYT`, `BRK`, ...).
    Command(u8),
}
