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

//! Error types for the gateway service

use crate::config::ConfigError;
use lantern_telnetcodec::CodecError;
use lantern_wscodec::{FrameError, HandshakeError};
use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway error types
#[derive(Debug, Error)]
pub enum GatewayError {
    /// I/O error from a client or upstream stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed Telnet input
    #[error("Telnet error: {0}")]
    Telnet(#[from] CodecError),

    /// Malformed WebSocket frame
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Rejected WebSocket opening handshake
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The upstream server refused the connection or was unreachable
    #[error("Unable to reach {target}: {source}")]
    Upstream {
        /// `host:port` that was dialled
        target: String,
        /// Underlying failure
        source: std::io::Error,
    },

    /// The upstream server did not answer in time
    #[error("Timed out connecting to {0}")]
    ConnectTimeout(String),

    /// Server is already running
    #[error("Server already running")]
    ServerAlreadyRunning,

    /// Server is not running
    #[error("Server not running")]
    ServerNotRunning,
}

impl GatewayError {
    /// Check if the error is a connection error
    ///
    /// Connection errors are the ordinary ways a peer goes away and are logged
    /// quietly.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Io(_) | GatewayError::Upstream { .. } | GatewayError::ConnectTimeout(_)
        )
    }

    /// Check if the error was caused by a peer breaking the wire protocol
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            GatewayError::Telnet(_) | GatewayError::Frame(_) | GatewayError::Handshake(_)
        )
    }
}
