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

//! Telnet wire constants ([RFC854](https://tools.ietf.org/html/rfc854)).

/// Interpret As Command
pub const IAC: u8 = 0xFF;
/// Indicates the demand that the other party stop performing an option.
pub const DONT: u8 = 0xFE;
/// Indicates the request that the other party perform an option.
pub const DO: u8 = 0xFD;
/// Indicates the refusal to perform an option.
pub const WONT: u8 = 0xFC;
/// Indicates the desire to begin performing an option.
pub const WILL: u8 = 0xFB;
/// Subnegotiation Begin
pub const SB: u8 = 0xFA;
/// Go Ahead
pub const GA: u8 = 0xF9;
/// Erase Line
pub const EL: u8 = 0xF8;
/// Erase Character
pub const EC: u8 = 0xF7;
/// Are You There
pub const AYT: u8 = 0xF6;
/// Abort Output
pub const AO: u8 = 0xF5;
/// Interrupt Process
pub const IP: u8 = 0xF4;
/// Break
pub const BRK: u8 = 0xF3;
/// Data Mark
pub const DM: u8 = 0xF2;
/// No Operation
pub const NOP: u8 = 0xF1;
/// Subnegotiation End
pub const SE: u8 = 0xF0;

/// Carriage Return
pub const CR: u8 = b'\r';
/// Line Feed
pub const LF: u8 = b'\n';

/// Option codes the gateway names explicitly.
pub mod option {
    /// Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    pub const BINARY: u8 = 0;
    /// Echo [RFC857](https://tools.ietf.org/html/rfc857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: u8 = 3;
    /// Terminal Type [RFC1091](https://tools.ietf.org/html/rfc1091)
    pub const TTYPE: u8 = 24;
    /// Negotiate About Window Size [RFC1073](https://tools.ietf.org/html/rfc1073)
    pub const NAWS: u8 = 31;
    /// Linemode [RFC1184](https://tools.ietf.org/html/rfc1184)
    pub const LINEMODE: u8 = 34;
    /// Mud Client Compression Protocol v2
    pub const COMPRESS2: u8 = 86;
    /// Generic Mud Communication Protocol
    pub const GMCP: u8 = 201;
}
