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

//! End-to-end tests driving a connection over an in-memory stream

use futures_util::{SinkExt, StreamExt};
use lantern_service::{
    Connection, ConnectionCounter, ConnectionId, GatewayConfig, Host, POLICY_REQUEST, REFUSAL,
    Result, User, policy_document,
};
use lantern_wscodec::{Frame, FrameCodec};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::{Duration, timeout};
use tokio_util::codec::Framed;

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Helper Functions
// ============================================================================

/// Spawn a connection for `config` and hand back the client end
fn open(config: GatewayConfig) -> (DuplexStream, JoinHandle<Result<()>>) {
    let (client, server) = duplex(64 * 1024);
    let connection = Connection::new(
        ConnectionId::new(1),
        "203.0.113.7:50000".parse().unwrap(),
        server,
        Arc::new(config),
        ConnectionCounter::new(),
    )
    .with_detect_timeout(Duration::from_millis(50))
    .with_connect_timeout(Duration::from_secs(2));
    (client, tokio::spawn(connection.run()))
}

/// A stand-in MUD listening on loopback
async fn mud() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Read raw bytes until `needle` has been seen
async fn read_until<R: AsyncRead + Unpin>(reader: &mut R, needle: &[u8]) -> Vec<u8> {
    let mut seen = Vec::new();
    let mut buf = [0u8; 1024];
    timeout(WAIT, async {
        while !contains(&seen, needle) {
            let n = reader.read(&mut buf).await.unwrap();
            assert!(n > 0, "closed before {:?}", String::from_utf8_lossy(needle));
            seen.extend_from_slice(&buf[..n]);
        }
    })
    .await
    .expect("timed out waiting for output");
    seen
}

/// Read WebSocket frames until their payloads contain `needle`
async fn frames_until(framed: &mut Framed<DuplexStream, FrameCodec>, needle: &[u8]) -> Vec<u8> {
    let mut seen = Vec::new();
    timeout(WAIT, async {
        while !contains(&seen, needle) {
            let frame = framed.next().await.expect("stream closed").expect("bad frame");
            seen.extend_from_slice(&frame.into_bytes());
        }
    })
    .await
    .expect("timed out waiting for frames");
    seen
}

fn draft76_request(path: &str) -> Vec<u8> {
    format!(
        "GET /{path} HTTP/1.1\r\n\
         Host: example.com\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key2: 12998 5 Y3 1  .P00\r\n\
         Upgrade: WebSocket\r\n\
         Sec-WebSocket-Key1: 4 @1  46546xW%0l 1 5\r\n\
         Origin: http://example.com\r\n\
         \r\n\
         ^n:ds[4U"
    )
    .into_bytes()
}

fn draft76_response(path: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 101 WebSocket Protocol Handshake\r\n\
         Upgrade: WebSocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Origin: http://example.com\r\n\
         Sec-WebSocket-Location: ws://example.com/{path}\r\n\
         \r\n\
         8jKS'y:G*Co,Wxa-"
    )
    .into_bytes()
}

/// Complete the draft-76 handshake for `path` and switch to framing
async fn upgrade(mut client: DuplexStream, path: &str) -> Framed<DuplexStream, FrameCodec> {
    client.write_all(&draft76_request(path)).await.unwrap();
    let expected = draft76_response(path);
    let mut response = vec![0u8; expected.len()];
    timeout(WAIT, client.read_exact(&mut response))
        .await
        .expect("timed out waiting for the handshake")
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&response), String::from_utf8_lossy(&expected));
    Framed::new(client, FrameCodec::new())
}

// ============================================================================
// Detection
// ============================================================================

#[tokio::test]
async fn test_policy_request() {
    let config = GatewayConfig::new(8080).with_host(Host::new("mud", "localhost", 4000));
    let (mut client, task) = open(config.clone());

    client.write_all(POLICY_REQUEST).await.unwrap();
    let mut document = Vec::new();
    client.read_to_end(&mut document).await.unwrap();

    assert_eq!(document, policy_document(&config));
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_plain_http_gets_bad_request() {
    let (mut client, task) = open(GatewayConfig::new(8080));

    client
        .write_all(b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n")
        .await
        .unwrap();
    let mut page = Vec::new();
    client.read_to_end(&mut page).await.unwrap();
    let page = String::from_utf8(page).unwrap();

    assert!(page.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{page}");
    assert!(page.contains("\r\nServer: Lantern/"));
    assert!(page.contains("This server will only serve WebSockets."));
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_silent_client_is_treated_as_telnet() {
    let config = GatewayConfig::new(8080).with_host(Host::new("mud", "localhost", 4000));
    let (mut client, task) = open(config);

    let output = read_until(&mut client, b"or Q to quit").await;
    assert!(contains(&output, b"WebSocket and Telnet gateway"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_three_bytes_wait_and_the_fourth_decides() {
    let config = GatewayConfig::new(8080).with_host(Host::new("mud", "localhost", 4000));
    let (mut client, task) = open(config);

    client.write_all(b"abc").await.unwrap();
    let mut buf = [0u8; 64];
    let quiet = timeout(Duration::from_millis(200), client.read(&mut buf)).await;
    assert!(quiet.is_err(), "answered before the fourth byte");

    client.write_all(b"d").await.unwrap();
    let output = read_until(&mut client, b"or Q to quit").await;
    assert!(contains(&output, b"WebSocket and Telnet gateway"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_partial_policy_request_is_telnet() {
    let config = GatewayConfig::new(8080).with_host(Host::new("mud", "localhost", 4000));
    let (mut client, task) = open(config);

    client.write_all(b"<policy-file").await.unwrap();
    let output = read_until(&mut client, b"or Q to quit").await;
    assert!(!contains(&output, b"cross-domain-policy"));

    drop(client);
    task.await.unwrap().unwrap();
}

// ============================================================================
// WebSocket Routing
// ============================================================================

#[tokio::test]
async fn test_websocket_direct_relay() {
    let (listener, port) = mud().await;
    let config = GatewayConfig::new(8080).with_host(Host::new("mud", "127.0.0.1", port));
    let (client, task) = open(config);
    let mut framed = upgrade(client, "mud").await;

    let greeting = frames_until(&mut framed, b"forwarding you to port").await;
    assert!(contains(&greeting, b"WebSocket and Telnet gateway"));
    assert!(contains(&greeting, port.to_string().as_bytes()));

    let (mut upstream, _) = listener.accept().await.unwrap();
    upstream.write_all(b"Welcome!\xFF\xFB\x01").await.unwrap();
    frames_until(&mut framed, b"Welcome!\xFF\xFB\x01").await;

    framed.send(Frame::from_bytes(b"look\r\n")).await.unwrap();
    let mut command = [0u8; 6];
    upstream.read_exact(&mut command).await.unwrap();
    assert_eq!(&command, b"look\r\n");

    framed.send(Frame::Close).await.unwrap();
    let reply = timeout(WAIT, framed.next()).await.unwrap();
    assert_eq!(reply.map(|frame| frame.unwrap()), Some(Frame::Close));
    let mut rest = Vec::new();
    upstream.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_websocket_credentials_in_path() {
    let (listener, port) = mud().await;
    let config = GatewayConfig::new(8080)
        .with_host(Host::new("gamma", "127.0.0.1", port).with_users(["alice"]))
        .with_user(User::from_password("alice", "wonderland"));
    let (client, task) = open(config);
    let mut framed = upgrade(client, "alice:wonderland@gamma").await;

    frames_until(&mut framed, b"forwarding you to port").await;
    let (upstream, _) = listener.accept().await.unwrap();

    drop(upstream);
    let end = timeout(WAIT, framed.next()).await.unwrap();
    assert!(end.is_none());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_websocket_refused_host() {
    let config = GatewayConfig::new(8080)
        .with_host(Host::new("gamma", "127.0.0.1", 4000).with_users(["alice"]))
        .with_user(User::from_password("alice", "wonderland"));
    let (client, task) = open(config);
    let mut framed = upgrade(client, "gamma").await;

    let refusal = frames_until(&mut framed, REFUSAL.as_bytes()).await;
    assert_eq!(refusal, REFUSAL.as_bytes());
    let end = timeout(WAIT, framed.next()).await.unwrap();
    assert!(end.is_none());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_websocket_menu_quit() {
    let config = GatewayConfig::new(8080)
        .with_host(Host::new("mud", "localhost", 4000))
        .with_default_host("mud");
    let (client, task) = open(config);
    let mut framed = upgrade(client, "menu").await;

    let menu = frames_until(&mut framed, b"or Q to quit").await;
    assert!(contains(&menu, b"L to log in"));

    framed.send(Frame::from_bytes(b"q\r\n")).await.unwrap();
    let end = timeout(WAIT, framed.next()).await.unwrap();
    assert!(end.is_none());
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_websocket_unknown_path_opens_session() {
    let config = GatewayConfig::new(8080).with_host(Host::new("mud", "localhost", 4000));
    let (client, task) = open(config);
    let mut framed = upgrade(client, "nowhere").await;

    frames_until(&mut framed, b"or Q to quit").await;
    framed.send(Frame::Close).await.unwrap();
    let reply = timeout(WAIT, framed.next()).await.unwrap();
    assert_eq!(reply.map(|frame| frame.unwrap()), Some(Frame::Close));
    task.await.unwrap().unwrap();
}

// ============================================================================
// Telnet Sessions
// ============================================================================

#[tokio::test]
async fn test_telnet_menu_selection_forwards_leftover() {
    let (listener, port) = mud().await;
    let config = GatewayConfig::new(8080)
        .with_host(Host::new("alpha", "127.0.0.1", port).with_name("Alpha"))
        .with_host(Host::new("beta", "mud.example", 23).with_name("Beta"));
    let (mut client, task) = open(config);

    client.write_all(b"1\r\nlook\r\n").await.unwrap();
    let output = read_until(&mut client, b"forwarding you to port").await;
    assert!(contains(&output, b"Alpha"));
    assert!(contains(&output, b"Beta"));

    let (mut upstream, _) = listener.accept().await.unwrap();
    let mut leftover = [0u8; 6];
    upstream.read_exact(&mut leftover).await.unwrap();
    assert_eq!(&leftover, b"look\r\n");

    upstream.write_all(b"You see a lantern.\r\n").await.unwrap();
    read_until(&mut client, b"You see a lantern.").await;

    drop(client);
    let mut rest = Vec::new();
    upstream.read_to_end(&mut rest).await.unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_telnet_login_then_select() {
    let (listener, port) = mud().await;
    let config = GatewayConfig::new(8080)
        .with_host(Host::new("gamma", "127.0.0.1", port).with_users(["alice"]))
        .with_user(User::from_password("alice", "wonderland"));
    let (mut client, task) = open(config);

    client.write_all(b"alice\r\n").await.unwrap();
    let output = read_until(&mut client, b"\xFF\xFB\x01").await;
    assert!(contains(&output, b"Username"));
    assert!(contains(&output, b"Password"));

    client.write_all(b"wonderland\r\n").await.unwrap();
    let output = read_until(&mut client, b"or Q to quit").await;
    assert!(contains(&output, b"\xFF\xFC\x01"));
    assert!(contains(&output, b"C host port to connect to a custom host"));

    client.write_all(b"1\r\n").await.unwrap();
    read_until(&mut client, b"forwarding you to port").await;
    let (upstream, _) = listener.accept().await.unwrap();

    drop(upstream);
    let mut rest = Vec::new();
    timeout(WAIT, client.read_to_end(&mut rest)).await.unwrap().unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_telnet_bad_login() {
    let config = GatewayConfig::new(8080)
        .with_host(Host::new("gamma", "127.0.0.1", 4000).with_users(["alice"]))
        .with_user(User::from_password("alice", "wonderland"));
    let (mut client, task) = open(config);

    client.write_all(b"alice\r\nguess\r\n").await.unwrap();
    let output = read_until(&mut client, b"Invalid username or password.").await;
    assert!(contains(&output, b"\xFF\xFC\x01"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unreachable_destination() {
    let (listener, port) = mud().await;
    drop(listener);
    let config = GatewayConfig::new(8080).with_host(Host::new("gone", "127.0.0.1", port));
    let (mut client, task) = open(config);

    read_until(&mut client, b"or Q to quit").await;
    client.write_all(b"1\r\n").await.unwrap();
    read_until(&mut client, b"Unable to connect to that host.").await;

    let result = task.await.unwrap();
    assert!(result.unwrap_err().is_connection_error());
}
