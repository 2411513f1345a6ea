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

//! Benchmarks for telnetcodec performance

use bytes::{Bytes, BytesMut};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lantern_telnetcodec::{LineBuffer, TelnetCodec, TelnetEvent, TelnetFrame, consts};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_encode_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_data_sizes");

    for size in [10usize, 100, 1000, 10000] {
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut codec = TelnetCodec::new();
            let mut buffer = BytesMut::with_capacity(size * 2);
            let data: Bytes = (0..size).map(|i| (i % 256) as u8).collect();

            b.iter(|| {
                buffer.clear();
                codec
                    .encode(black_box(TelnetFrame::Data(data.clone())), &mut buffer)
                    .unwrap();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Decoding Benchmarks
// ============================================================================

fn bench_decode_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_data_sizes");

    for size in [10usize, 100, 1000, 10000] {
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut codec = TelnetCodec::new();
            let data: Vec<u8> = (0..size).map(|i| b'a' + (i % 26) as u8).collect();

            b.iter(|| {
                let mut buffer = BytesMut::from(&data[..]);
                while let Some(event) = codec.decode(&mut buffer).unwrap() {
                    black_box(event);
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Realistic Scenario Benchmarks
// ============================================================================

fn bench_mud_session(c: &mut Criterion) {
    let mut stream = Vec::new();
    for i in 0..100 {
        stream.extend_from_slice(format!("say hello number {i}\r\n").as_bytes());
        if i % 10 == 0 {
            stream.extend_from_slice(&[consts::IAC, consts::DO, consts::option::NAWS]);
            stream.extend_from_slice(&[
                consts::IAC,
                consts::SB,
                consts::option::NAWS,
                0,
                80,
                0,
                24,
                consts::IAC,
                consts::SE,
            ]);
        }
    }

    let mut group = c.benchmark_group("scenarios");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("mud_session_lines", |b| {
        let mut codec = TelnetCodec::new();
        b.iter(|| {
            let mut buffer = BytesMut::from(&stream[..]);
            let mut lines = LineBuffer::new();
            while let Some(event) = codec.decode(&mut buffer).unwrap() {
                if let TelnetEvent::Data(data) = event {
                    lines.extend(&data);
                }
            }
            while let Some(line) = lines.next_line() {
                black_box(line);
            }
        });
    });
    group.finish();
}

criterion_group!(encoding_benches, bench_encode_data_sizes);

criterion_group!(decoding_benches, bench_decode_data_sizes);

criterion_group!(scenario_benches, bench_mud_session);

criterion_main!(encoding_benches, decoding_benches, scenario_benches);
