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

//! Protocol detection on the first bytes of a connection

use crate::access;
use crate::config::GatewayConfig;
use lantern_wscodec::MAX_HEADER_LEN;

/// Request a Flash client sends before opening a socket
pub const POLICY_REQUEST: &[u8] = b"<policy-file-request/>\0";

const HANDSHAKE_PREFIX: &[u8] = b"GET ";
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// What the peer turned out to speak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Not enough bytes to decide
    Pending,
    /// Flash cross-domain policy request
    Policy,
    /// WebSocket opening handshake with a complete or oversized header block
    Handshake,
    /// Anything else is a Telnet client
    Telnet,
}

/// Classify the bytes received so far
pub fn classify(buf: &[u8]) -> Detection {
    if buf == POLICY_REQUEST {
        return Detection::Policy;
    }
    if buf.starts_with(HANDSHAKE_PREFIX) {
        if buf.len() > MAX_HEADER_LEN
            || buf
                .windows(HEADER_TERMINATOR.len())
                .any(|window| window == HEADER_TERMINATOR)
        {
            return Detection::Handshake;
        }
        return Detection::Pending;
    }
    if buf.len() < HANDSHAKE_PREFIX.len() {
        return Detection::Pending;
    }
    Detection::Telnet
}

/// The cross-domain policy document, NUL terminated
pub fn policy_document(config: &GatewayConfig) -> Vec<u8> {
    let ports = access::policy_ports(config)
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let mut document = format!(
        "<?xml version=\"1.0\"?>\n\
         <!DOCTYPE cross-domain-policy SYSTEM \"/xml/dtds/cross-domain-policy.dtd\">\n\
         <cross-domain-policy>\n\
         \t<allow-access-from domain=\"*\" to-ports=\"{ports}\" />\n\
         </cross-domain-policy>"
    )
    .into_bytes();
    document.push(0);
    document
}
