//! Benchmarks for frame parsing, command serialization and splitting.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_proto::{split_message, Command, Line};

/// Simple PING frame
const SIMPLE_FRAME: &str = "PING :irc.example.com";

/// Frame with source prefix
const PREFIX_FRAME: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Frame with IRCv3 tags
const TAGGED_FRAME: &str = "@time=2023-01-01T00:00:00.000Z;msgid=abc123;+example/tag=value :nick!user@host PRIVMSG #channel :Hello with tags!";

/// CTCP request that gets unwrapped
const CTCP_FRAME: &str = ":nick!user@host PRIVMSG me :\x01PING 1700000000\x01";

/// Names reply, the largest frame a join usually triggers
const NAMES_FRAME: &str = ":irc.server.net 353 me = #channel :~owner &admin @op %half +voice alice bob carol dave eve mallory trent";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Line Parsing");

    for (name, frame) in [
        ("simple_ping", SIMPLE_FRAME),
        ("with_prefix", PREFIX_FRAME),
        ("with_tags", TAGGED_FRAME),
        ("ctcp", CTCP_FRAME),
        ("names_reply", NAMES_FRAME),
    ] {
        group.bench_with_input(BenchmarkId::new("parse", name), frame, |b, s| {
            b.iter(|| {
                let line = Line::parse(black_box(s)).unwrap();
                black_box(line)
            })
        });
    }

    group.finish();
}

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Command Serialization");

    group.bench_function("privmsg_simple", |b| {
        b.iter(|| {
            let frames = Command::privmsg(black_box("#channel"), black_box("Hello, world!")).frames(450);
            black_box(frames)
        })
    });

    group.bench_function("mode_with_args", |b| {
        let cmd = Command::MODE("#channel".into(), vec!["+ov".into(), "alice".into(), "bob".into()]);
        b.iter(|| {
            let s = black_box(&cmd).to_string();
            black_box(s)
        })
    });

    group.finish();
}

fn benchmark_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Splitting");

    let prose = "The quick brown fox jumps over the lazy dog. ".repeat(40);
    let unbroken = "x".repeat(2000);

    for (name, body) in [("prose", prose.as_str()), ("unbroken", unbroken.as_str())] {
        group.bench_with_input(BenchmarkId::new("split_450", name), body, |b, s| {
            b.iter(|| {
                let parts = split_message(black_box(s), 450);
                black_box(parts)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_serialization,
    benchmark_splitting
);
criterion_main!(benches);
