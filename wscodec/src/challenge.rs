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

use crate::{HandshakeError, HandshakeResult, KEY3_LEN};
use byteorder::{BigEndian, ByteOrder};
use md5::{Digest, Md5};

/// Computes the numeric value of a `Sec-WebSocket-Key1`/`Key2` header.
///
/// The digits of the key, read as one decimal number, are divided by the
/// number of spaces in the key. The number must fit in 32 bits, there must be
/// at least one space, and the division must be exact.
pub fn key_value(key: &str) -> HandshakeResult<u32> {
    let digits: String = key.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(HandshakeError::InvalidKey("no digits"));
    }
    let number = digits
        .parse::<u64>()
        .ok()
        .and_then(|number| u32::try_from(number).ok())
        .ok_or(HandshakeError::InvalidKey("number out of range"))?;
    let spaces = u32::try_from(key.chars().filter(|&c| c == ' ').count())
        .map_err(|_| HandshakeError::InvalidKey("too many spaces"))?;
    if spaces == 0 {
        return Err(HandshakeError::InvalidKey("no spaces"));
    }
    if number % spaces != 0 {
        return Err(HandshakeError::InvalidKey("not divisible by spaces"));
    }
    Ok(number / spaces)
}

/// Computes the 16 byte draft-76 challenge response:
/// `MD5(be32(key1) || be32(key2) || key3)`.
pub fn challenge_response(
    key1: &str,
    key2: &str,
    key3: &[u8; KEY3_LEN],
) -> HandshakeResult<[u8; 16]> {
    let mut input = [0u8; 8 + KEY3_LEN];
    BigEndian::write_u32(&mut input[0..4], key_value(key1)?);
    BigEndian::write_u32(&mut input[4..8], key_value(key2)?);
    input[8..].copy_from_slice(key3);

    let digest = Md5::digest(input);
    let mut response = [0u8; 16];
    response.copy_from_slice(&digest);
    Ok(response)
}
