//! Benchmark – `textscan::Cursor` primitives over in-memory and streamed input
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use textscan::{Boundary, Cursor, DIGITS, LETTERS, WHITE_SPACE};

/// A deterministic `key = 1234` document of roughly `target_len` bytes.
fn make_payload(target_len: usize) -> String {
    let mut s = String::with_capacity(target_len + 32);
    let mut n = 0usize;
    while s.len() < target_len {
        s.push_str("key");
        s.push_str(&n.to_string());
        s.push_str(" = ");
        s.push_str(&(n * 7919 % 100_000).to_string());
        s.push('\n');
        n += 1;
    }
    s
}

/// Scans every line as key, `=`, digits. Returns the digit count so the work
/// cannot be optimised away.
fn scan_lines(mut cursor: Cursor, flush: bool) -> usize {
    let mut digits = 0;
    loop {
        let key = cursor.scan_while(&LETTERS, Boundary::Retain).unwrap();
        if key.is_empty() {
            return digits;
        }
        cursor.next_digits(0, usize::MAX).unwrap();
        cursor.next_white_space().unwrap();
        cursor.expect_char('=').unwrap();
        cursor.next_white_space().unwrap();
        digits += cursor.scan_while(&DIGITS, Boundary::Retain).unwrap().len();
        cursor.scan_while(&WHITE_SPACE, Boundary::Retain).unwrap();
        if flush {
            cursor.flush_history();
        }
    }
}

/// Reads forward then steps all the way back, `rounds` times.
fn rewind(payload: &str, rounds: usize) -> usize {
    let mut cursor = Cursor::from_str("bench", payload);
    let len = payload.chars().count();
    for _ in 0..rounds {
        cursor.next_length(len).unwrap();
        cursor.walk_back(0);
    }
    cursor.history_len()
}

fn bench_scanning(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_lines");
    group.measurement_time(Duration::from_secs(5));

    for &size in &[1_024usize, 64 * 1_024, 1_024 * 1_024] {
        let payload = make_payload(size);
        group.throughput(Throughput::Bytes(payload.len() as u64));

        group.bench_with_input(BenchmarkId::new("str_retained", size), &payload, |b, p| {
            b.iter(|| black_box(scan_lines(Cursor::from_str("bench", p.as_str()), false)));
        });
        group.bench_with_input(BenchmarkId::new("str_flushed", size), &payload, |b, p| {
            b.iter(|| black_box(scan_lines(Cursor::from_str("bench", p.as_str()), true)));
        });
        group.bench_with_input(BenchmarkId::new("reader_flushed", size), &payload, |b, p| {
            b.iter(|| {
                let reader = std::io::Cursor::new(p.clone().into_bytes());
                black_box(scan_lines(Cursor::from_reader("bench", reader), true))
            });
        });
    }
    group.finish();

    let payload = make_payload(16 * 1_024);
    c.bench_function("rewind_16k_x4", |b| b.iter(|| black_box(rewind(&payload, 4))));
}

criterion_group!(benches, bench_scanning);
criterion_main!(benches);
