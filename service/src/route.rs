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

//! WebSocket path routing and relay notices
//!
//! A WebSocket client picks its destination with the request path:
//!
//! ```text
//! [<user>[:<password>]@]<hostkey | port_<N> | menu>
//! ```

use crate::ansi::{RESET, fg};
use crate::types::Destination;

/// Path that always opens the interactive menu
pub const MENU_PATH: &str = "menu";

/// Sent to a client whose path names a host it may not reach
pub const REFUSAL: &str = "  You don't have permission to connect to that host.";

/// A request path split into credentials and target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePath<'a> {
    /// User name and password, when the path carries them
    pub credentials: Option<(&'a str, &'a str)>,
    /// Host key, `port_<N>` or `menu`
    pub target: &'a str,
}

impl<'a> RoutePath<'a> {
    /// Split a path (without its leading slash) at the first `@`, then the first `:`
    pub fn parse(path: &'a str) -> Self {
        match path.split_once('@') {
            Some((credentials, target)) => {
                let (username, password) = credentials.split_once(':').unwrap_or((credentials, ""));
                Self {
                    credentials: (!username.is_empty()).then_some((username, password)),
                    target,
                }
            }
            None => Self {
                credentials: None,
                target: path,
            },
        }
    }

    /// True when the path asks for the menu explicitly
    pub fn is_menu(&self) -> bool {
        self.target == MENU_PATH
    }
}

/// Notice shown just before a relay to `destination` starts
pub fn forwarding_notice(destination: &Destination) -> String {
    if destination.is_loopback() {
        format!(
            "{}Lantern{RESET} is forwarding you to port {}...\r\n\r\n",
            fg(9),
            destination.port
        )
    } else {
        format!(
            "{}Lantern{RESET} is forwarding you to: {}{}:{RESET}{}...\r\n\r\n",
            fg(9),
            destination.host,
            fg(8),
            destination.port
        )
    }
}
