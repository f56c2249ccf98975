//! Benchmarks for the embedded handshake and channel
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use serde_json::{json, Value};
use url::Url;

use superset_embedded::channel::{ChannelOptions, MessageChannel, Switchboard};
use superset_embedded::embedded::next_attempt;
use superset_embedded::protocol::{validate_message, Envelope, OriginPolicy, RpcError};

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");

    let handshake = Envelope::port_transfer().to_value();
    let foreign = json!({"type": "webpackHotUpdate", "hash": "4f2a"});
    let open = OriginPolicy::AllowAny;
    let allow_list = OriginPolicy::from_allowed(&[
        "https://a.example".to_string(),
        "https://b.example".to_string(),
        "https://portal.example".to_string(),
    ]);

    group.bench_function("validate_handshake", |b| {
        b.iter(|| validate_message(black_box("https://portal.example"), black_box(&handshake), &open))
    });

    group.bench_function("validate_allow_list", |b| {
        b.iter(|| validate_message(black_box("https://portal.example"), black_box(&handshake), &allow_list))
    });

    group.bench_function("reject_foreign", |b| {
        b.iter(|| validate_message(black_box("https://portal.example"), black_box(&foreign), &open))
    });

    group.finish();
}

fn scroll_size(_ctx: &mut u64, _args: Value) -> Result<Value, RpcError> {
    Ok(json!({"width": 1280, "height": 960}))
}

fn guest_token(ctx: &mut u64, args: Value) -> Result<Value, RpcError> {
    if args["guestToken"].is_string() {
        *ctx += 1;
    }
    Ok(Value::Null)
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for batch in [1u64, 100, 1000] {
        group.throughput(Throughput::Elements(batch));

        group.bench_function(format!("get_reply_{}", batch), |b| {
            let MessageChannel { port1: host, port2 } = MessageChannel::new();
            let mut board = Switchboard::new(port2, ChannelOptions::new("superset", false));
            board.define_method("getScrollSize", scroll_size).unwrap();
            board.define_method("guestToken", guest_token).unwrap();
            let mut ctx = 0u64;
            board.start(&mut ctx);

            b.iter(|| {
                for i in 0..batch {
                    let message = if i % 2 == 0 {
                        json!({"switchboardAction": "get", "method": "getScrollSize", "messageId": "m_host_1", "args": null})
                    } else {
                        json!({"switchboardAction": "get", "method": "guestToken", "messageId": "m_host_2", "args": {"guestToken": "t"}})
                    };
                    board.handle_message(&mut ctx, black_box(message)).unwrap();
                }
                host.drain()
            });
        });
    }

    group.finish();
}

fn bench_retry(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry");

    let fresh = Url::parse("https://bi.example/embedded/6a3c/?standalone=1").unwrap();
    let retried = Url::parse("https://bi.example/embedded/6a3c/?standalone=1&attempt=2").unwrap();

    group.bench_function("first_failure", |b| b.iter(|| next_attempt(black_box(&fresh), 3)));
    group.bench_function("repeat_failure", |b| b.iter(|| next_attempt(black_box(&retried), 3)));

    group.finish();
}

criterion_group!(benches, bench_envelope, bench_dispatch, bench_retry);
criterion_main!(benches);
