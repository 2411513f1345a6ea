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

//! # Lantern Telnet Codec
//!
//! A small Telnet (RFC 854) codec for a gateway that only needs to *see through*
//! the Telnet control channel: it separates application bytes from `IAC`
//! sequences, and it can emit the handful of negotiation frames a login prompt
//! needs.
//!
//! ## Overview
//!
//! - **Data**: runs of plain bytes are emitted as a single [`TelnetEvent::Data`],
//!   an escaped `IAC IAC` is emitted as a literal `0xFF` byte.
//! - **Negotiation**: `IAC {WILL, WONT, DO, DONT} <option>` becomes
//!   [`TelnetEvent::Negotiate`]. No option state is kept.
//! - **Subnegotiation**: `IAC SB <option> ... IAC SE` becomes
//!   [`TelnetEvent::Subnegotiate`] with doubled `IAC`s collapsed.
//! - **Partial input**: an incomplete sequence is left in the source buffer
//!   untouched, so the next read simply appends to it.
//!
//! [`LineBuffer`] assembles decoded data into CR-stripped, LF-terminated lines.
//!
//! ## Usage Example
//!
//! ```rust
//! use lantern_telnetcodec::{LineBuffer, TelnetCodec, TelnetEvent};
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//!
//! let mut codec = TelnetCodec::new();
//! let mut lines = LineBuffer::new();
//! let mut input = BytesMut::from(&b"look\r\n\xFF\xFB\x01north\r"[..]);
//!
//! while let Some(event) = codec.decode(&mut input).unwrap() {
//!     if let TelnetEvent::Data(data) = event {
//!         lines.extend(&data);
//!     }
//! }
//! assert_eq!(lines.next_line().as_deref(), Some("look"));
//! assert_eq!(lines.next_line(), None);
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod event;
mod frame;
mod line;
mod option;
mod result;

pub use self::codec::TelnetCodec;
pub use self::event::{TelnetEvent, TelnetVerb};
pub use self::frame::TelnetFrame;
pub use self::line::{DEFAULT_MAX_LINE_LEN, LineBuffer};
pub use self::option::TelnetOption;
pub use self::result::{CodecError, CodecResult};
