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

//! Byte string mapping for text frames.
//!
//! Browser MUD clients of the draft-76 era exchange raw Telnet bytes as
//! "binary strings": every byte is a character in `U+0000..=U+00FF`. Encoded as
//! UTF-8 such text can never contain `0xFF`, so it cannot end a frame early.

/// Maps every byte to the character with the same code point.
#[must_use]
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Maps characters up to `U+00FF` back to single bytes.
///
/// Characters above `U+00FF` cannot come from [`decode`]; they are passed on as
/// their UTF-8 encoding.
#[must_use]
pub fn encode(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match u8::try_from(ch) {
            Ok(byte) => bytes.push(byte),
            Err(_) => bytes.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes()),
        }
    }
    bytes
}
