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

use crate::consts;
use std::fmt::Formatter;

///
/// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
///
/// Only the options a MUD gateway is likely to see are named; everything else
/// is carried as [`TelnetOption::Unknown`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::BINARY`] Telnet Binary Transmission
    TransmitBinary,
    /// [`consts::option::ECHO`] Telnet Echo Option
    Echo,
    /// [`consts::option::SGA`] Suppress Go Ahead
    SuppressGoAhead,
    /// [`consts::option::TTYPE`] Terminal Type
    TTYPE,
    /// [`consts::option::NAWS`] Negotiate About Window Size
    NAWS,
    /// [`consts::option::LINEMODE`] Linemode
    Linemode,
    /// [`consts::option::COMPRESS2`] MCCP v2
    Compress2,
    /// [`consts::option::GMCP`] Generic Mud Communication Protocol
    GMCP,
    /// Any option without a name of its own
    Unknown(u8),
}

impl TelnetOption {
    /// Converts the option into its wire byte.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        match self {
            TelnetOption::TransmitBinary => consts::option::BINARY,
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TTYPE => consts::option::TTYPE,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::Compress2 => consts::option::COMPRESS2,
            TelnetOption::GMCP => consts::option::GMCP,
            TelnetOption::Unknown(byte) => byte,
        }
    }

    /// Converts a wire byte into an option, falling back to [`TelnetOption::Unknown`].
    #[must_use]
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::BINARY => TelnetOption::TransmitBinary,
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TTYPE,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::COMPRESS2 => TelnetOption::Compress2,
            consts::option::GMCP => TelnetOption::GMCP,
            byte => TelnetOption::Unknown(byte),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        TelnetOption::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::TransmitBinary => write!(f, "BINARY"),
            TelnetOption::Echo => write!(f, "ECHO"),
            TelnetOption::SuppressGoAhead => write!(f, "SGA"),
            TelnetOption::TTYPE => write!(f, "TTYPE"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::Linemode => write!(f, "LINEMODE"),
            TelnetOption::Compress2 => write!(f, "COMPRESS2"),
            TelnetOption::GMCP => write!(f, "GMCP"),
            TelnetOption::Unknown(byte) => write!(f, "UNKNOWN({byte})"),
        }
    }
}
