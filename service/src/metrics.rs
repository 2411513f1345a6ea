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

//! Connection counting and metric names
//!
//! The live connection count is shown to users in the banner, so it is kept
//! in a shared atomic rather than only exported through `metrics`.

use metrics::{counter, gauge};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Connections accepted since startup
pub const CONNECTIONS_TOTAL: &str = "lantern.connections.total";
/// Connections currently open
pub const CONNECTIONS_ACTIVE: &str = "lantern.connections.active";
/// Connections dropped at accept
pub const CONNECTIONS_REJECTED: &str = "lantern.connections.rejected";
/// WebSocket handshakes answered with `101`
pub const HANDSHAKES_ACCEPTED: &str = "lantern.handshakes.accepted";
/// WebSocket handshakes refused
pub const HANDSHAKES_REJECTED: &str = "lantern.handshakes.rejected";
/// Bytes relayed from clients to upstream servers
pub const RELAY_BYTES_UPSTREAM: &str = "lantern.relay.bytes_upstream";
/// Bytes relayed from upstream servers to clients
pub const RELAY_BYTES_DOWNSTREAM: &str = "lantern.relay.bytes_downstream";

/// Shared count of live connections
///
/// Cloning shares the count. Every accepted connection holds a
/// [`ConnectionGuard`] for as long as it is open.
#[derive(Debug, Clone, Default)]
pub struct ConnectionCounter {
    live: Arc<AtomicUsize>,
}

impl ConnectionCounter {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new connection until the returned guard is dropped
    pub fn acquire(&self) -> ConnectionGuard {
        let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        counter!(CONNECTIONS_TOTAL).increment(1);
        gauge!(CONNECTIONS_ACTIVE).set(now as f64);
        ConnectionGuard {
            live: self.live.clone(),
        }
    }

    /// Number of live connections
    pub fn current(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Keeps one connection counted
#[derive(Debug)]
pub struct ConnectionGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let now = self.live.fetch_sub(1, Ordering::SeqCst) - 1;
        gauge!(CONNECTIONS_ACTIVE).set(now as f64);
    }
}

/// Record a connection dropped at accept
pub fn connection_rejected(reason: &'static str) {
    counter!(CONNECTIONS_REJECTED, "reason" => reason).increment(1);
}
