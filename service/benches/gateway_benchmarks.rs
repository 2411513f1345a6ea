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

//! Benchmarks for gateway service operations

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lantern_service::{
    Connection, ConnectionCounter, ConnectionId, GatewayConfig, Host, POLICY_REQUEST, Session,
    SessionContext, User, classify, find_host, policy_document,
};
use std::hint::black_box;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio::runtime::Runtime;

fn config() -> GatewayConfig {
    let mut config = GatewayConfig::new(8080).with_default_host("world00");
    for n in 0..40u16 {
        let host = Host::new(format!("world{n:02}"), "localhost", 4000 + n);
        config = config.with_host(host.with_name(format!("World {n}")));
    }
    config
        .with_host(Host::new("staff", "localhost", 5000).with_users(["alice"]))
        .with_user(User::from_password("alice", "wonderland"))
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    let handshake = b"GET /world07 HTTP/1.1\r\nHost: example.com\r\n\r\n";

    group.bench_function("classify_policy", |b| {
        b.iter(|| classify(black_box(POLICY_REQUEST)))
    });
    group.bench_function("classify_handshake", |b| {
        b.iter(|| classify(black_box(handshake)))
    });
    group.bench_function("classify_telnet", |b| b.iter(|| classify(black_box(b"look\r\n"))));

    let config = config();
    group.bench_function("policy_document", |b| {
        b.iter(|| policy_document(black_box(&config)))
    });

    group.finish();
}

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing");
    let config = config();
    let alice = config.users.get("alice");

    group.bench_function("find_host_by_key", |b| {
        b.iter(|| find_host(&config, black_box("world31"), None))
    });
    group.bench_function("find_host_by_port", |b| {
        b.iter(|| find_host(&config, black_box("port_4031"), None))
    });
    group.bench_function("find_host_restricted", |b| {
        b.iter(|| find_host(&config, black_box("staff"), alice))
    });

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let config = Arc::new(config());

    group.bench_function("open_menu", |b| {
        b.iter(|| {
            let context = SessionContext::new(config.clone(), ConnectionCounter::new(), None);
            black_box(Session::new(context).take_output())
        })
    });

    group.bench_function("select_destination", |b| {
        b.iter(|| {
            let context = SessionContext::new(config.clone(), ConnectionCounter::new(), None);
            let mut session = Session::new(context);
            session.feed(black_box(b"12\r\n"));
            black_box(session.finish())
        })
    });

    group.finish();
}

fn bench_connection(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("connection");
    let config = Arc::new(config());
    group.throughput(Throughput::Elements(1));

    group.bench_function("policy_round_trip", |b| {
        b.to_async(&rt).iter(|| {
            let config = config.clone();
            async move {
                let (mut client, server) = duplex(16 * 1024);
                let connection = Connection::new(
                    ConnectionId::new(1),
                    "127.0.0.1:50000".parse().unwrap(),
                    server,
                    config,
                    ConnectionCounter::new(),
                );
                client.write_all(POLICY_REQUEST).await.unwrap();
                connection.run().await.unwrap();
                let mut document = Vec::new();
                client.read_to_end(&mut document).await.unwrap();
                black_box(document)
            }
        })
    });

    group.finish();
}

criterion_group!(detection_benches, bench_detection, bench_routing);

criterion_group!(session_benches, bench_session, bench_connection);

criterion_main!(detection_benches, session_benches);
