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

use thiserror::Error;

/// Result Type for Handshake Operations
pub type HandshakeResult<T> = Result<T, HandshakeError>;

/// Errors raised while decoding or encoding frames.
#[derive(Debug, Error)]
pub enum FrameError {
    /// I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame announced or accumulated more bytes than allowed.
    #[error("Frame of {length} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Length seen so far
        length: u64,
        /// Configured limit
        limit: usize,
    },

    /// The length prefix does not fit in 64 bits.
    #[error("Frame length prefix overflows")]
    LengthOverflow,
}

/// Reasons a handshake request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// The request line is not `GET /<path> HTTP/1.1`.
    #[error("Malformed request line")]
    BadRequestLine,

    /// No `Upgrade` header; answered with a 400 page.
    #[error("Missing Upgrade header")]
    MissingUpgrade,

    /// A header every WebSocket request must carry is absent.
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    /// A challenge key is unusable.
    #[error("Invalid challenge key: {0}")]
    InvalidKey(&'static str),

    /// The header block outgrew the limit before its terminator arrived.
    #[error("Header block exceeds {0} bytes")]
    HeaderTooLarge(usize),
}

impl HandshakeError {
    /// True when the peer should get the HTTP 400 page instead of a silent close.
    #[must_use]
    pub fn wants_bad_request_page(&self) -> bool {
        matches!(self, HandshakeError::MissingUpgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameError, HandshakeError};

    #[test]
    fn only_missing_upgrade_gets_a_page() {
        assert!(HandshakeError::MissingUpgrade.wants_bad_request_page());
        assert!(!HandshakeError::BadRequestLine.wants_bad_request_page());
        assert!(!HandshakeError::MissingHeader("Host").wants_bad_request_page());
        assert!(!HandshakeError::InvalidKey("no spaces").wants_bad_request_page());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            HandshakeError::MissingHeader("Origin").to_string(),
            "Missing Origin header"
        );
        let err = FrameError::TooLarge {
            length: 10,
            limit: 4,
        };
        assert_eq!(err.to_string(), "Frame of 10 bytes exceeds the 4 byte limit");
    }
}
