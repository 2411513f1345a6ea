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

//! Per-connection protocol state machine
//!
//! Every accepted stream is driven by one [`Connection`] in its own task:
//!
//! 1. Detection looks at the first bytes and picks the Flash policy
//!    response, the WebSocket handshake, or plain Telnet.
//! 2. WebSocket clients are routed by request path, either straight to a
//!    host or into the interactive session.
//! 3. The interactive session (login and menu) runs until a destination is
//!    chosen or the client quits.
//! 4. The relay copies bytes until either side closes.

use crate::access::{self, HostLookup};
use crate::ansi;
use crate::banner;
use crate::config::{GatewayConfig, User};
use crate::detect::{self, Detection};
use crate::error::Result;
use crate::metrics::{ConnectionCounter, HANDSHAKES_ACCEPTED, HANDSHAKES_REJECTED};
use crate::relay::{self, DEFAULT_CONNECT_TIMEOUT, Relay};
use crate::route::{self, REFUSAL, RoutePath};
use crate::session::{Session, SessionContext};
use crate::types::{ConnectionId, ConnectionState, Destination};
use bytes::{Buf, Bytes, BytesMut};
use lantern_telnetcodec::{TelnetCodec, TelnetEvent, TelnetFrame, TelnetOption, TelnetVerb};
use lantern_wscodec::{Frame, FrameCodec, HandshakeRequest, bad_request};
use metrics::counter;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, info, instrument, trace, warn};

/// How long a silent client has before it is treated as Telnet
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(2);

/// `Server` header of the HTTP 400 page
pub const SERVER_NAME: &str = concat!("Lantern/", env!("CARGO_PKG_VERSION"));

const READ_BUFFER: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Open,
    Closed,
}

/// One client connection and everything it owns
pub struct Connection<S> {
    id: ConnectionId,
    peer: SocketAddr,
    stream: S,
    state: ConnectionState,
    config: Arc<GatewayConfig>,
    counter: ConnectionCounter,
    websocket: bool,
    inbound: BytesMut,
    frames: FrameCodec,
    telnet: TelnetCodec,
    telnet_pending: BytesMut,
    detect_timeout: Duration,
    connect_timeout: Duration,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an accepted stream
    pub fn new(
        id: ConnectionId,
        peer: SocketAddr,
        stream: S,
        config: Arc<GatewayConfig>,
        counter: ConnectionCounter,
    ) -> Self {
        Self {
            id,
            peer,
            stream,
            state: ConnectionState::New,
            config,
            counter,
            websocket: false,
            inbound: BytesMut::with_capacity(READ_BUFFER),
            frames: FrameCodec::new(),
            telnet: TelnetCodec::new(),
            telnet_pending: BytesMut::new(),
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set how long a silent client has before it is treated as Telnet
    pub fn with_detect_timeout(mut self, timeout: Duration) -> Self {
        self.detect_timeout = timeout;
        self
    }

    /// Set how long to wait for an upstream server to accept
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Connection identifier
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Drive the connection until it closes
    #[instrument(skip(self), fields(connection_id = %self.id, peer = %self.peer))]
    pub async fn run(mut self) -> Result<()> {
        let result = self.drive().await;
        self.advance(ConnectionState::Closed);
        let _ = self.stream.shutdown().await;
        debug!("Connection closed");
        result
    }

    async fn drive(&mut self) -> Result<()> {
        self.advance(ConnectionState::Detecting);
        match self.detect().await? {
            None => {
                debug!("Peer left before it could be identified");
                Ok(())
            }
            Some(Detection::Policy) => {
                self.advance(ConnectionState::PolicyDone);
                let document = detect::policy_document(&self.config);
                self.stream.write_all(&document).await?;
                self.stream.flush().await?;
                info!("Sent cross-domain policy");
                Ok(())
            }
            Some(Detection::Handshake) => {
                self.advance(ConnectionState::WsHandshaking);
                self.handshake().await
            }
            Some(Detection::Telnet | Detection::Pending) => {
                self.advance(ConnectionState::TelnetDirect);
                info!("Telnet client connected");
                self.interactive(None).await
            }
        }
    }

    /// Read until the first bytes identify the protocol
    ///
    /// Only the first read is timed; once anything arrives detection waits
    /// for enough bytes to decide. Returns `None` when the peer closes first.
    async fn detect(&mut self) -> Result<Option<Detection>> {
        let deadline = Instant::now() + self.detect_timeout;
        loop {
            match detect::classify(&self.inbound) {
                Detection::Pending => {}
                decided => return Ok(Some(decided)),
            }
            let read = if self.inbound.is_empty() {
                let read = tokio::time::timeout_at(deadline, self.read_more()).await;
                match read {
                    Ok(read) => read?,
                    Err(_) => {
                        debug!("Nothing received in {:?}, assuming Telnet", self.detect_timeout);
                        return Ok(Some(Detection::Telnet));
                    }
                }
            } else {
                self.read_more().await?
            };
            if read == 0 {
                return Ok(None);
            }
        }
    }

    async fn handshake(&mut self) -> Result<()> {
        let (request, consumed) = loop {
            match HandshakeRequest::parse(&self.inbound) {
                Ok(Some(parsed)) => break parsed,
                Ok(None) => {
                    if self.read_more().await? == 0 {
                        debug!("Peer left during the handshake");
                        return Ok(());
                    }
                }
                Err(err) => {
                    counter!(HANDSHAKES_REJECTED).increment(1);
                    return Err(err.into());
                }
            }
        };
        self.inbound.advance(consumed);

        let response = match request.accept() {
            Ok(response) => response,
            Err(err) if err.wants_bad_request_page() => {
                counter!(HANDSHAKES_REJECTED).increment(1);
                info!("Plain HTTP request for /{}, answering 400", request.path());
                self.stream.write_all(&bad_request(SERVER_NAME)).await?;
                self.stream.flush().await?;
                return Ok(());
            }
            Err(err) => {
                counter!(HANDSHAKES_REJECTED).increment(1);
                return Err(err.into());
            }
        };
        if !access::check_origin(&self.config, response.origin()) {
            counter!(HANDSHAKES_REJECTED).increment(1);
            warn!("Origin {:?} is not allowed", response.origin());
            return Ok(());
        }
        if access::is_blacklisted(&self.config, self.peer.ip()) {
            counter!(HANDSHAKES_REJECTED).increment(1);
            warn!("Blacklisted peer attempted a handshake");
            return Ok(());
        }

        self.stream.write_all(&response.to_bytes()).await?;
        self.stream.flush().await?;
        self.websocket = true;
        counter!(HANDSHAKES_ACCEPTED).increment(1);
        info!("WebSocket handshake accepted for {}", response.location());

        let config = Arc::clone(&self.config);
        let route = RoutePath::parse(request.path());
        let user = route
            .credentials
            .and_then(|(username, password)| access::check_user(&config, username, password))
            .cloned();
        if let Some((username, _)) = route.credentials {
            match &user {
                Some(_) => info!("User {} authenticated by path", username),
                None => warn!("Invalid credentials for {:?} in path", username),
            }
        }

        if route.is_menu() {
            return self.interactive(user).await;
        }
        match access::find_host(&config, route.target, user.as_ref()) {
            HostLookup::Found(host) => {
                let destination = Destination::new(host.host.as_str(), host.port);
                let banner = banner::render(self.counter.current());
                self.write_client(banner.as_bytes()).await?;
                self.relay(destination, Bytes::new()).await
            }
            HostLookup::NotAuthorized => {
                warn!("Refused path {:?}", route.target);
                self.write_client(REFUSAL.as_bytes()).await?;
                Ok(())
            }
            HostLookup::NotFound => self.interactive(user).await,
        }
    }

    async fn interactive(&mut self, user: Option<User>) -> Result<()> {
        self.advance(ConnectionState::Interactive);
        let context = SessionContext::new(Arc::clone(&self.config), self.counter.clone(), user);
        let mut session = Session::new(context);
        self.flush_session(&mut session).await?;

        loop {
            let flow = self.absorb(&mut session)?;
            self.flush_session(&mut session).await?;
            if flow == Flow::Closed {
                debug!("Client sent a closing frame");
                self.write_frame(Frame::Close).await?;
                return Ok(());
            }
            if session.is_finished() {
                break;
            }
            if self.read_more().await? == 0 {
                debug!("Client left the session");
                return Ok(());
            }
        }

        let outcome = session.finish();
        let Some(destination) = outcome.destination else {
            info!("Client quit");
            return Ok(());
        };
        let mut leftover = BytesMut::new();
        if !outcome.leftover.is_empty() {
            TelnetFrame::Data(outcome.leftover).write_to(&mut leftover);
        }
        leftover.extend_from_slice(&self.telnet_pending.split());
        self.relay(destination, leftover.freeze()).await
    }

    /// Feed buffered client input to the session
    fn absorb(&mut self, session: &mut Session) -> Result<Flow> {
        if !self.websocket {
            let data = self.inbound.split();
            self.absorb_telnet(&data, session)?;
            return Ok(Flow::Open);
        }
        while !session.is_finished() {
            let Some(frame) = self.frames.decode(&mut self.inbound)? else {
                break;
            };
            if frame == Frame::Close {
                return Ok(Flow::Closed);
            }
            self.absorb_telnet(&frame.into_bytes(), session)?;
        }
        Ok(Flow::Open)
    }

    fn absorb_telnet(&mut self, data: &[u8], session: &mut Session) -> Result<()> {
        self.telnet_pending.extend_from_slice(data);
        while !session.is_finished() {
            let Some(event) = self.telnet.decode(&mut self.telnet_pending)? else {
                break;
            };
            match event {
                TelnetEvent::Data(data) => session.feed(&data),
                TelnetEvent::Negotiate(verb, option) => self.negotiate(verb, option),
                TelnetEvent::Subnegotiate { option, payload } => {
                    trace!("Ignoring {} byte subnegotiation for {}", payload.len(), option);
                }
                TelnetEvent::GoAhead => trace!("Ignoring go ahead"),
                TelnetEvent::Command(command) => trace!("Ignoring command {}", command),
            }
        }
        Ok(())
    }

    /// Option negotiation is accepted and discarded
    fn negotiate(&self, verb: TelnetVerb, option: TelnetOption) {
        trace!("Ignoring IAC {} {}", verb, option);
    }

    async fn relay(&mut self, destination: Destination, leftover: Bytes) -> Result<()> {
        self.advance(ConnectionState::Relaying);
        self.write_client(route::forwarding_notice(&destination).as_bytes())
            .await?;
        let mut upstream = match relay::connect(&destination, self.connect_timeout).await {
            Ok(upstream) => upstream,
            Err(err) => {
                let notice = format!("{}\r\n", ansi::error("Unable to connect to that host."));
                if let Err(write_err) = self.write_client(notice.as_bytes()).await {
                    debug!("Could not tell the client the connect failed: {}", write_err);
                }
                return Err(err);
            }
        };
        info!("Relaying to {}", destination);

        let relay = if self.websocket {
            Relay::websocket(self.frames.clone())
        } else {
            Relay::telnet()
        };
        let pending = self.inbound.split();
        let stats = relay
            .run(&mut self.stream, &mut upstream, pending, leftover)
            .await?;
        info!(
            "Relay to {} finished ({} bytes up, {} bytes down)",
            destination, stats.upstream_bytes, stats.downstream_bytes
        );
        Ok(())
    }

    async fn flush_session(&mut self, session: &mut Session) -> Result<()> {
        let output = session.take_output();
        if output.is_empty() {
            return Ok(());
        }
        self.write_client(&output).await
    }

    /// Write to the client, in a text frame when it speaks WebSocket
    async fn write_client(&mut self, data: &[u8]) -> Result<()> {
        if self.websocket {
            return self.write_frame(Frame::from_bytes(data)).await;
        }
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn write_frame(&mut self, frame: Frame) -> Result<()> {
        let mut framed = BytesMut::new();
        self.frames.encode(frame, &mut framed)?;
        self.stream.write_all(&framed).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read_more(&mut self) -> Result<usize> {
        self.inbound.reserve(READ_BUFFER);
        Ok(self.stream.read_buf(&mut self.inbound).await?)
    }

    fn advance(&mut self, next: ConnectionState) {
        let previous = self.state;
        if self.state.advance(next) {
            trace!("{} -> {}", previous, next);
        } else {
            warn!("Refused state change {} -> {}", previous, next);
        }
    }
}

impl<S> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("state", &self.state)
            .field("websocket", &self.websocket)
            .finish()
    }
}
