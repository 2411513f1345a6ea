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

use crate::{HandshakeError, HandshakeResult, challenge_response, latin1};
use tracing::debug;

/// End of the HTTP header block.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";
/// Number of challenge bytes that follow the header block in draft-76.
pub const KEY3_LEN: usize = 8;
/// Longest header block accepted before its terminator (8 KiB).
pub const MAX_HEADER_LEN: usize = 8 * 1024;

const REQUEST_PREFIX: &str = "GET /";
const REQUEST_SUFFIX: &str = " HTTP/1.1";

/// A parsed WebSocket opening request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeRequest {
    path: String,
    headers: Vec<(String, String)>,
    key3: Option<[u8; KEY3_LEN]>,
}

impl HandshakeRequest {
    /// Parses a request from the front of `buf`.
    ///
    /// Returns `Ok(None)` until the header block and, when `Sec-WebSocket-Key2`
    /// is present, the eight `key3` bytes have arrived. On success the number
    /// of bytes consumed is returned alongside the request; anything after that
    /// belongs to the frame stream.
    pub fn parse(buf: &[u8]) -> HandshakeResult<Option<(HandshakeRequest, usize)>> {
        let Some(header_end) = buf
            .windows(HEADER_TERMINATOR.len())
            .position(|window| window == HEADER_TERMINATOR)
        else {
            if buf.len() > MAX_HEADER_LEN {
                return Err(HandshakeError::HeaderTooLarge(MAX_HEADER_LEN));
            }
            return Ok(None);
        };
        let head = latin1::decode(&buf[..header_end]);
        let mut lines = head.split("\r\n");
        let request_line = lines.next().unwrap_or_default();
        let path = parse_request_line(request_line)?;

        let mut headers = Vec::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.push((name.trim().to_string(), value.trim_start().to_string()));
            }
        }

        let mut request = HandshakeRequest {
            path: path.to_string(),
            headers,
            key3: None,
        };
        let mut consumed = header_end + HEADER_TERMINATOR.len();
        if request.header("Sec-WebSocket-Key2").is_some() {
            let Some(bytes) = buf.get(consumed..consumed + KEY3_LEN) else {
                return Ok(None);
            };
            let mut key3 = [0u8; KEY3_LEN];
            key3.copy_from_slice(bytes);
            request.key3 = Some(key3);
            consumed += KEY3_LEN;
        }
        Ok(Some((request, consumed)))
    }

    /// Requested path without its leading slash.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Looks up a header by case-insensitive name; the last occurrence wins.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `Origin` header, if any.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.header("Origin")
    }

    /// True when the request carries the draft-76 challenge.
    #[must_use]
    pub fn has_challenge(&self) -> bool {
        self.key3.is_some()
    }

    /// Validates the request and builds the response.
    ///
    /// A missing `Upgrade` header is reported as [`HandshakeError::MissingUpgrade`]
    /// so the caller can answer with [`bad_request`]. Every other failure is
    /// meant to be answered by closing the connection.
    pub fn accept(&self) -> HandshakeResult<HandshakeResponse> {
        if self.header("Upgrade").is_none() {
            return Err(HandshakeError::MissingUpgrade);
        }
        let _connection = self
            .header("Connection")
            .ok_or(HandshakeError::MissingHeader("Connection"))?;
        let host = self
            .header("Host")
            .ok_or(HandshakeError::MissingHeader("Host"))?;
        let origin = self
            .origin()
            .ok_or(HandshakeError::MissingHeader("Origin"))?;

        let challenge = match &self.key3 {
            Some(key3) => {
                let key1 = self
                    .header("Sec-WebSocket-Key1")
                    .ok_or(HandshakeError::MissingHeader("Sec-WebSocket-Key1"))?;
                let key2 = self
                    .header("Sec-WebSocket-Key2")
                    .ok_or(HandshakeError::MissingHeader("Sec-WebSocket-Key2"))?;
                Some(challenge_response(key1, key2, key3)?)
            }
            None => None,
        };

        let response = HandshakeResponse {
            origin: origin.to_string(),
            location: format!("ws://{}/{}", host, self.path),
            challenge,
        };
        debug!(
            "Accepted handshake for {} (challenge: {})",
            response.location,
            response.challenge.is_some()
        );
        Ok(response)
    }
}

/// Extracts the path from `GET /<path> HTTP/1.1`.
fn parse_request_line(line: &str) -> HandshakeResult<&str> {
    let path = line
        .strip_prefix(REQUEST_PREFIX)
        .and_then(|rest| rest.strip_suffix(REQUEST_SUFFIX))
        .ok_or(HandshakeError::BadRequestLine)?;
    if path.chars().any(char::is_whitespace) {
        return Err(HandshakeError::BadRequestLine);
    }
    Ok(path)
}

/// The server half of a successful handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandshakeResponse {
    origin: String,
    location: String,
    challenge: Option<[u8; 16]>,
}

impl HandshakeResponse {
    /// Echoed `Origin`.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `ws://` location of the accepted resource.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Challenge digest appended after the headers, if any.
    #[must_use]
    pub fn challenge(&self) -> Option<&[u8; 16]> {
        self.challenge.as_ref()
    }

    /// Wire form of the response.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let prefix = if self.challenge.is_some() { "Sec-" } else { "" };
        let head = format!(
            "HTTP/1.1 101 WebSocket Protocol Handshake\r\n\
             Upgrade: WebSocket\r\n\
             Connection: Upgrade\r\n\
             {prefix}WebSocket-Origin: {}\r\n\
             {prefix}WebSocket-Location: {}\r\n\r\n",
            self.origin, self.location
        );
        let mut out = latin1::encode(&head);
        if let Some(challenge) = &self.challenge {
            out.extend_from_slice(challenge);
        }
        out
    }
}

/// HTTP 400 response for plain HTTP requests.
#[must_use]
pub fn bad_request(server: &str) -> Vec<u8> {
    let body = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         \t<head>\n\
         \t\t<title>400 Bad Request</title>\n\
         \t</head>\n\
         \t<body>\n\
         \t\t<h1>400 Bad Request</h1>\n\
         \t\t<p>This server will only serve WebSockets.</p>\n\
         \t\t<hr>\n\
         \t\t<p><i>{server}</i></p>\n\
         \t</body>\n\
         </html>"
    );
    format!(
        "HTTP/1.1 400 Bad Request\r\n\
         Server: {server}\r\n\
         Connection: close\r\n\
         Content-Type: text/html\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {body}",
        body.len()
    )
    .into_bytes()
}
