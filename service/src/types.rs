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

//! Core types for the gateway

use std::fmt;

/// Unique identifier for a connection (monotonically increasing, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a new connection ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle of a client connection
///
/// ```text
/// New -> Detecting -> PolicyDone ------------------------> Closed
///                  -> WsHandshaking -> Interactive -> Relaying -> Closed
///                  -> TelnetDirect  -> Interactive
///                     WsHandshaking ----------------> Relaying
/// ```
///
/// Any state may move straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Accepted, nothing read yet
    New = 0,
    /// Reading the first bytes to decide what the peer speaks
    Detecting = 1,
    /// Flash policy file sent
    PolicyDone = 2,
    /// Reading or answering a WebSocket opening handshake
    WsHandshaking = 3,
    /// Raw Telnet client detected
    TelnetDirect = 4,
    /// Driving the login and menu handlers
    Interactive = 5,
    /// Bytes flow between client and upstream untouched
    Relaying = 6,
    /// Connection is closed
    Closed = 7,
}

impl ConnectionState {
    /// Check if the connection is in a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::PolicyDone | Self::Closed)
    }

    /// Check whether `next` is a legal successor of this state
    pub fn can_advance_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        match (self, next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (New, Detecting) => true,
            (Detecting, PolicyDone | WsHandshaking | TelnetDirect) => true,
            (WsHandshaking, Interactive | Relaying) => true,
            (TelnetDirect, Interactive) => true,
            (Interactive, Relaying) => true,
            _ => false,
        }
    }

    /// Move to `next`, refusing any transition that would go backwards
    ///
    /// Returns `false` and leaves the state untouched when the transition is
    /// not allowed.
    pub fn advance(&mut self, next: ConnectionState) -> bool {
        if self.can_advance_to(next) {
            *self = next;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Detecting => write!(f, "detecting"),
            Self::PolicyDone => write!(f, "policy-done"),
            Self::WsHandshaking => write!(f, "ws-handshaking"),
            Self::TelnetDirect => write!(f, "telnet-direct"),
            Self::Interactive => write!(f, "interactive"),
            Self::Relaying => write!(f, "relaying"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Where a relay should connect to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Host name or address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Destination {
    /// Create a new destination
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// True for `localhost` and `127.0.0.1`
    pub fn is_loopback(&self) -> bool {
        is_loopback_name(&self.host)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// True for the two spellings of the local machine the gateway recognises
pub(crate) fn is_loopback_name(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1"
}
