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

//! # Lantern WebSocket Codec
//!
//! Pre-standard WebSocket support for browser MUD clients: the draft-75 and
//! draft-76 ("Hixie-76") opening handshake and their sentinel/length framing.
//!
//! ## Core Components
//!
//! ### [`HandshakeRequest`]
//!
//! Parses the client's `GET` request, including the eight `key3` bytes that
//! follow the header block in the draft-76 variant, and produces the
//! [`HandshakeResponse`] (with the MD5 challenge digest when one is required).
//!
//! ### [`FrameCodec`]
//!
//! Implements [`Decoder`](tokio_util::codec::Decoder) and
//! [`Encoder`](tokio_util::codec::Encoder) for [`Frame`]:
//!
//! - `0x00 <utf-8> 0xFF` text frames
//! - `0x80.. <7-bit length> <payload>` length-prefixed frames
//! - `0xFF 0x00` closing handshake
//!
//! ### [`latin1`]
//!
//! One character per byte mapping so arbitrary byte streams can travel inside
//! text frames.
//!
//! ## Usage Example
//!
//! ```rust
//! use lantern_wscodec::{Frame, FrameCodec};
//! use bytes::BytesMut;
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut codec = FrameCodec::new();
//! let mut wire = BytesMut::new();
//! codec.encode(Frame::Text("look".to_string()), &mut wire).unwrap();
//! assert_eq!(&wire[..], b"\x00look\xFF");
//! assert_eq!(codec.decode(&mut wire).unwrap(), Some(Frame::Text("look".to_string())));
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

mod challenge;
mod frame;
mod handshake;
pub mod latin1;
mod result;

pub use self::challenge::{challenge_response, key_value};
pub use self::frame::{DEFAULT_MAX_FRAME_LEN, Frame, FrameCodec};
pub use self::handshake::{
    HEADER_TERMINATOR, HandshakeRequest, HandshakeResponse, KEY3_LEN, MAX_HEADER_LEN, bad_request,
};
pub use self::result::{FrameError, HandshakeError, HandshakeResult};
