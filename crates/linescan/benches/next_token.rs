//! Benchmark – `linescan::TokenizerSession::next_token`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use linescan::{DEFAULT_CAPACITY, DEFAULT_SEPARATORS, Scan, SeparatorSet, TokenizerSession};

/// Produce a *deterministic* line of exactly `DEFAULT_CAPACITY - 1` bytes made
/// of words `word_len` bytes long, each followed by one separator.
fn make_line(word_len: usize) -> Vec<u8> {
    let target = DEFAULT_CAPACITY - 1;
    let mut line = Vec::with_capacity(target);
    let mut separators = DEFAULT_SEPARATORS.iter().cycle();
    let mut letters = (b'a'..=b'z').cycle();
    while line.len() < target {
        if (line.len() + 1) % (word_len + 1) == 0 {
            line.extend(separators.next());
        } else {
            line.extend(letters.next());
        }
    }
    line
}

/// Write `line` and read every token back; returns the number of tokens so
/// Criterion cannot optimise the work away.
fn run_session(session: &mut TokenizerSession, line: &[u8], bound: usize) -> usize {
    session.write(line).expect("line fits the buffer");
    let mut produced = 0usize;
    while let Ok(Scan::Token(token)) = session.next_token(bound) {
        produced += token.len() + 1;
    }
    produced
}

fn bench_next_token(c: &mut Criterion) {
    let defaults = SeparatorSet::new(DEFAULT_SEPARATORS, DEFAULT_CAPACITY).unwrap();
    let mut session = TokenizerSession::new(&defaults).unwrap();

    let mut group = c.benchmark_group("next_token");
    for &word_len in &[1usize, 8, 64] {
        let line = make_line(word_len);
        for &bound in &[4usize, DEFAULT_CAPACITY] {
            group.bench_with_input(
                BenchmarkId::new(format!("word_{word_len}"), bound),
                &line,
                |b, line| {
                    b.iter(|| black_box(run_session(&mut session, black_box(line), bound)));
                },
            );
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(debug_assertions) {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_next_token }
criterion_main!(benches);
