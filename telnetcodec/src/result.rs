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

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Represents possible errors that can occur in the codec handling process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    #[error("I/O error during {operation}: {kind:?}")]
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// A subnegotiation block grew past the configured limit without `IAC SE`.
    #[error("Subnegotiation for option {option} exceeded {limit} bytes")]
    SubnegotiationOverflow {
        /// Option byte of the runaway block
        option: u8,
        /// Configured limit in bytes
        limit: usize,
    },
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CodecError;

    #[test]
    fn io_error_conversion_keeps_kind() {
        let err: CodecError =
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "stream ended").into();
        assert!(matches!(
            err,
            CodecError::IOError {
                kind: std::io::ErrorKind::UnexpectedEof,
                ..
            }
        ));
    }

    #[test]
    fn overflow_display() {
        let err = CodecError::SubnegotiationOverflow {
            option: 24,
            limit: 16,
        };
        assert_eq!(
            err.to_string(),
            "Subnegotiation for option 24 exceeded 16 bytes"
        );
    }
}
