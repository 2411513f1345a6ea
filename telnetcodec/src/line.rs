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

use crate::consts;
use bytes::{Buf, Bytes, BytesMut};
use tracing::warn;

/// Default limit on an unterminated line (8 KiB).
pub const DEFAULT_MAX_LINE_LEN: usize = 8 * 1024;

/// Assembles decoded Telnet data into lines.
///
/// Lines are split on line feed and every carriage return in a line is
/// dropped. Whatever follows the last line feed stays buffered, byte for byte,
/// until more data completes it. A line that outgrows the limit before its
/// line feed arrives is dropped through to that line feed.
#[derive(Clone, Debug)]
pub struct LineBuffer {
    buffer: BytesMut,
    max_line_len: usize,
    discarding: bool,
}

impl LineBuffer {
    /// Creates an empty line buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the longest unterminated line kept.
    #[must_use]
    pub fn with_max_line_len(mut self, limit: usize) -> Self {
        self.max_line_len = limit;
        self
    }

    /// Appends decoded data.
    pub fn extend(&mut self, data: &[u8]) {
        let data = if self.discarding {
            let Some(end) = data.iter().position(|&byte| byte == consts::LF) else {
                return;
            };
            self.discarding = false;
            &data[end + 1..]
        } else {
            data
        };
        self.buffer.extend_from_slice(data);
    }

    /// Removes and returns the next complete line without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let Some(end) = self.buffer.iter().position(|&byte| byte == consts::LF) else {
            if self.buffer.len() > self.max_line_len {
                warn!(
                    "Dropping a line of {} bytes without a line feed",
                    self.buffer.len()
                );
                self.buffer.clear();
                self.discarding = true;
            }
            return None;
        };
        let line = self.buffer.split_to(end);
        self.buffer.advance(1);
        let line: Vec<u8> = line.into_iter().filter(|&byte| byte != consts::CR).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Takes every buffered byte as received, complete lines included.
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        LineBuffer {
            buffer: BytesMut::new(),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            discarding: false,
        }
    }
}
