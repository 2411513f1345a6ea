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

//! Bidirectional relay between a client and an upstream server
//!
//! Once a destination is chosen the gateway stops looking at content. Bytes
//! are copied both ways until either side closes. WebSocket clients still
//! need framing, so their frames are unwrapped on the way up and upstream
//! output is wrapped in text frames on the way down.

use crate::error::{GatewayError, Result};
use crate::metrics::{RELAY_BYTES_DOWNSTREAM, RELAY_BYTES_UPSTREAM};
use crate::types::Destination;
use bytes::{Bytes, BytesMut};
use lantern_wscodec::{Frame, FrameCodec};
use metrics::counter;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

/// How long to wait for an upstream server to accept
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const BUFFER_SIZE: usize = 8192;

/// Open a connection to `destination`
pub async fn connect(destination: &Destination, limit: Duration) -> Result<TcpStream> {
    let target = destination.to_string();
    let dial = TcpStream::connect((destination.host.as_str(), destination.port));
    let stream = match tokio::time::timeout(limit, dial).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(GatewayError::Upstream { target, source }),
        Err(_) => return Err(GatewayError::ConnectTimeout(target)),
    };
    stream.set_nodelay(true)?;
    Ok(stream)
}

/// Byte counts of a finished relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Bytes written to the upstream server
    pub upstream_bytes: u64,
    /// Bytes read from the upstream server
    pub downstream_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Open,
    Closed,
}

/// Copies bytes between a client and an upstream server
#[derive(Debug, Default)]
pub struct Relay {
    frames: Option<FrameCodec>,
    stats: RelayStats,
}

impl Relay {
    /// Relay for a raw Telnet client
    pub fn telnet() -> Self {
        Self::default()
    }

    /// Relay for a WebSocket client
    pub fn websocket(frames: FrameCodec) -> Self {
        Self {
            frames: Some(frames),
            stats: RelayStats::default(),
        }
    }

    /// Run until either side closes
    ///
    /// `pending` holds client bytes already read but not yet forwarded; for a
    /// WebSocket client these are still framed. `leftover` is unframed input
    /// that goes upstream before anything else.
    pub async fn run<C, U>(
        mut self,
        client: &mut C,
        upstream: &mut U,
        mut pending: BytesMut,
        leftover: Bytes,
    ) -> Result<RelayStats>
    where
        C: AsyncRead + AsyncWrite + Unpin,
        U: AsyncRead + AsyncWrite + Unpin,
    {
        if !leftover.is_empty() {
            self.send_upstream(upstream, &leftover).await?;
        }
        if self.forward_client(client, upstream, &mut pending).await? == Flow::Open {
            let mut downstream = BytesMut::with_capacity(BUFFER_SIZE);
            pending.reserve(BUFFER_SIZE);
            loop {
                tokio::select! {
                    read = client.read_buf(&mut pending) => {
                        if read? == 0 {
                            debug!("Client closed the relay");
                            break;
                        }
                        let flow = self.forward_client(client, upstream, &mut pending).await?;
                        if flow == Flow::Closed {
                            break;
                        }
                    }
                    read = upstream.read_buf(&mut downstream) => {
                        if read? == 0 {
                            debug!("Upstream closed the relay");
                            break;
                        }
                        let chunk = downstream.split();
                        self.send_downstream(client, &chunk).await?;
                    }
                }
            }
        }
        let _ = upstream.shutdown().await;
        let _ = client.shutdown().await;
        Ok(self.stats)
    }

    async fn forward_client<C, U>(
        &mut self,
        client: &mut C,
        upstream: &mut U,
        pending: &mut BytesMut,
    ) -> Result<Flow>
    where
        C: AsyncWrite + Unpin,
        U: AsyncWrite + Unpin,
    {
        let Some(frames) = self.frames.as_mut() else {
            if !pending.is_empty() {
                let chunk = pending.split();
                self.send_upstream(upstream, &chunk).await?;
            }
            return Ok(Flow::Open);
        };
        let mut payloads = Vec::new();
        let mut flow = Flow::Open;
        while let Some(frame) = frames.decode(pending)? {
            if frame == Frame::Close {
                flow = Flow::Closed;
                break;
            }
            payloads.push(frame.into_bytes());
        }
        for payload in payloads {
            self.send_upstream(upstream, &payload).await?;
        }
        if flow == Flow::Closed {
            debug!("Client sent a closing frame");
            let mut close = BytesMut::with_capacity(2);
            FrameCodec::new().encode(Frame::Close, &mut close)?;
            client.write_all(&close).await?;
            client.flush().await?;
        }
        Ok(flow)
    }

    async fn send_upstream<U>(&mut self, upstream: &mut U, data: &[u8]) -> Result<()>
    where
        U: AsyncWrite + Unpin,
    {
        upstream.write_all(data).await?;
        upstream.flush().await?;
        self.stats.upstream_bytes += data.len() as u64;
        counter!(RELAY_BYTES_UPSTREAM).increment(data.len() as u64);
        trace!("Relayed {} bytes upstream", data.len());
        Ok(())
    }

    async fn send_downstream<C>(&mut self, client: &mut C, data: &[u8]) -> Result<()>
    where
        C: AsyncWrite + Unpin,
    {
        match self.frames.as_mut() {
            Some(frames) => {
                let mut framed = BytesMut::with_capacity(data.len() * 2 + 2);
                frames.encode(Frame::from_bytes(data), &mut framed)?;
                client.write_all(&framed).await?;
            }
            None => client.write_all(data).await?,
        }
        client.flush().await?;
        self.stats.downstream_bytes += data.len() as u64;
        counter!(RELAY_BYTES_DOWNSTREAM).increment(data.len() as u64);
        trace!("Relayed {} bytes downstream", data.len());
        Ok(())
    }
}
