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

//! Gateway server
//!
//! The [`GatewayServer`] owns the listening transport, applies the blacklist
//! and connection cap at accept, and spawns one task per connection.

use crate::access;
use crate::config::GatewayConfig;
use crate::connection::Connection;
use crate::error::{GatewayError, Result};
use crate::metrics::{self, ConnectionCounter};
use crate::transport::{TcpTransport, Transport};
use crate::types::ConnectionId;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// WebSocket and Telnet gateway server
///
/// # Example
///
/// ```no_run
/// use lantern_service::{GatewayConfig, GatewayServer, Host};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = GatewayConfig::new(4000).with_host(Host::new("mud", "localhost", 5000));
///     let server = GatewayServer::bind(config).await?;
///
///     server.start().await?;
///
///     // Server is now running, wait for shutdown signal
///     // tokio::signal::ctrl_c().await?;
///     server.shutdown().await?;
///
///     Ok(())
/// }
/// ```
pub struct GatewayServer<T: Transport = TcpTransport> {
    /// Gateway configuration
    config: Arc<GatewayConfig>,
    /// Listening transport
    transport: Arc<T>,
    /// Live connection count
    counter: ConnectionCounter,
    /// Actual bind address
    bind_address: SocketAddr,
    /// Server start time
    started_at: Instant,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Shutdown notification
    shutdown_notify: Arc<Notify>,
    /// Accept loop task handle
    accept_handle: Arc<tokio::sync::Mutex<Option<JoinHandle<()>>>>,
    /// Next connection identifier
    next_id: Arc<AtomicU64>,
}

impl GatewayServer<TcpTransport> {
    /// Bind a TCP listener on the configured address
    ///
    /// This binds but does not start accepting connections.
    /// Call `start()` to begin accepting connections.
    pub async fn bind(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = TcpTransport::bind(config.listen_addr()).await?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> GatewayServer<T> {
    /// Create a server accepting from an existing transport
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        let bind_address = transport.local_addr()?;
        tracing::info!(
            "Gateway bound to {} with {} hosts and {} users",
            bind_address,
            config.hosts.len(),
            config.users.len()
        );

        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            counter: ConnectionCounter::new(),
            bind_address,
            started_at: Instant::now(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
            accept_handle: Arc::new(tokio::sync::Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Start accepting connections
    ///
    /// The accept loop runs in its own task until `shutdown()` is called.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(GatewayError::ServerAlreadyRunning);
        }

        tracing::info!("Starting gateway on {}", self.bind_address);
        if let Some(max) = self.config.general.connections {
            tracing::info!("Accepting up to {} connections", max);
        }

        let handle = self.spawn_accept_loop();
        *self.accept_handle.lock().await = Some(handle);

        Ok(())
    }

    /// Spawn the accept loop task
    fn spawn_accept_loop(&self) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let config = self.config.clone();
        let counter = self.counter.clone();
        let running = self.running.clone();
        let shutdown_notify = self.shutdown_notify.clone();
        let next_id = self.next_id.clone();

        tokio::spawn(async move {
            loop {
                // Check if we should shutdown
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let accept_result = tokio::select! {
                    result = transport.accept() => result,
                    _ = shutdown_notify.notified() => break,
                };

                match accept_result {
                    Ok((stream, peer_addr)) => {
                        if access::is_blacklisted(&config, peer_addr.ip()) {
                            tracing::warn!("Dropping blacklisted peer {}", peer_addr);
                            metrics::connection_rejected("blacklist");
                            drop(stream);
                            continue;
                        }

                        if let Some(max) = config.general.connections {
                            if counter.current() >= max {
                                tracing::warn!(
                                    "Connection limit reached ({}), rejecting connection from {}",
                                    max,
                                    peer_addr
                                );
                                metrics::connection_rejected("limit");
                                drop(stream);
                                continue;
                            }
                        }

                        let guard = counter.acquire();
                        let id = ConnectionId::new(next_id.fetch_add(1, Ordering::SeqCst));
                        tracing::debug!("Connection {} accepted from {}", id, peer_addr);

                        let connection =
                            Connection::new(id, peer_addr, stream, config.clone(), counter.clone());
                        tokio::spawn(async move {
                            let _guard = guard;
                            match connection.run().await {
                                Ok(()) => {}
                                Err(e) if e.is_connection_error() => {
                                    tracing::debug!("Connection {} ended: {}", id, e);
                                }
                                Err(e) if e.is_protocol_error() => {
                                    tracing::info!("Connection {} broke protocol: {}", id, e);
                                }
                                Err(e) => {
                                    tracing::warn!("Connection {} failed: {}", id, e);
                                }
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);

                        // Back off on errors to avoid tight loop
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }

            tracing::info!("Accept loop terminated");
        })
    }

    /// Stop accepting connections
    ///
    /// Connections already relaying are left to finish on their own.
    pub async fn shutdown(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::ServerNotRunning);
        }

        tracing::info!("Shutting down gateway");

        // Notify accept loop to stop
        self.shutdown_notify.notify_waiters();

        // Wait for accept loop to finish
        if let Some(handle) = self.accept_handle.lock().await.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }

        tracing::info!(
            "Gateway shutdown complete, {} connections still open",
            self.counter.current()
        );

        Ok(())
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the server's bind address
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Get the number of live connections
    pub fn connection_count(&self) -> usize {
        self.counter.current()
    }

    /// Time since the server was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Get the gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl<T: Transport> std::fmt::Debug for GatewayServer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayServer")
            .field("bind_address", &self.bind_address())
            .field("running", &self.is_running())
            .field("connection_count", &self.connection_count())
            .field("uptime", &self.uptime())
            .finish()
    }
}

// Implement Drop to ensure cleanup
impl<T: Transport> Drop for GatewayServer<T> {
    fn drop(&mut self) {
        if self.running.load(Ordering::SeqCst) {
            tracing::warn!("GatewayServer dropped while still running");
            self.running.store(false, Ordering::SeqCst);
            self.shutdown_notify.notify_waiters();
        }
    }
}
