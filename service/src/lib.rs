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

//! Lantern Gateway Service
//!
//! This crate puts old MUD servers within reach of browsers that only speak
//! the early WebSocket drafts (Hixie-75 and Hixie-76), while still serving
//! plain Telnet clients on the same port.
//!
//! Every accepted connection is classified from its first bytes:
//!
//! - a Flash `<policy-file-request/>` gets the cross-domain policy document;
//! - an HTTP `GET` is treated as a WebSocket opening handshake and routed by
//!   its request path;
//! - anything else, or silence, is a Telnet client.
//!
//! Clients that do not name a destination get an interactive session with a
//! login prompt and a host menu. Once a destination is settled the gateway
//! connects to it and relays bytes both ways, wrapping them in WebSocket text
//! frames for browser clients.
//!
//! # Architecture
//!
//! ```text
//! GatewayServer
//!     ↓
//! Connection (detect → handshake → session → relay)
//!     ↓
//! Session → Handler (Login | Menu)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lantern_service::{GatewayConfig, GatewayServer, Host, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::new(8080)
//!         .with_host(Host::new("mud", "localhost", 4000).with_name("Local MUD"))
//!         .with_user(User::from_password("admin", "secret"));
//!     let server = GatewayServer::bind(config).await?;
//!     server.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod access;
mod ansi;
mod banner;
mod config;
mod connection;
mod detect;
mod error;
mod handler;
mod login;
mod menu;
mod metrics;
mod relay;
mod route;
mod server;
mod session;
mod transport;
mod types;

pub use self::access::{
    HostLookup, authorized_hosts, can_reach_any, check_origin, check_user, find_host,
    is_auth_host, is_blacklisted, policy_ports,
};
pub use self::config::{ConfigError, GatewayConfig, GeneralConfig, Host, User, hash_password};
pub use self::connection::{Connection, DEFAULT_DETECT_TIMEOUT, SERVER_NAME};
pub use self::detect::{Detection, POLICY_REQUEST, classify, policy_document};
pub use self::error::{GatewayError, Result};
pub use self::handler::{Handler, Login, Menu};
pub use self::metrics::{
    CONNECTIONS_ACTIVE, CONNECTIONS_REJECTED, CONNECTIONS_TOTAL, ConnectionCounter,
    ConnectionGuard, HANDSHAKES_ACCEPTED, HANDSHAKES_REJECTED, RELAY_BYTES_DOWNSTREAM,
    RELAY_BYTES_UPSTREAM,
};
pub use self::relay::{DEFAULT_CONNECT_TIMEOUT, Relay, RelayStats, connect};
pub use self::route::{MENU_PATH, REFUSAL, RoutePath, forwarding_notice};
pub use self::server::GatewayServer;
pub use self::session::{Session, SessionContext, SessionOutcome, Transition};
pub use self::transport::{TcpTransport, Transport};
pub use self::types::{ConnectionId, ConnectionState, Destination};
