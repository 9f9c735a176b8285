//! Criterion benchmarks for wallet aggregation.
//!
//! Covers: full-batch ingestion plus finalization, and the borrow/repay pairing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lendscore_aggregate::aggregator::aggregate;
use lendscore_aggregate::timing::borrow_repay_gaps;
use lendscore_core::types::{EventBatch, TxEvent, TxKind};

/// 10k events spread over 500 wallets, every kind represented.
fn synthetic_batch() -> EventBatch {
    (0..10_000i64)
        .map(|i| {
            let kind = TxKind::ALL[(i % 5) as usize];
            let mut event = TxEvent::new(kind)
                .with_wallet(format!("0x{:040x}", i % 500))
                .with_timestamp(1_600_000_000 + i * 37);
            if kind.carries_amount() {
                event = event.with_amount((i % 97) as f64 * 10.0);
            }
            event
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let batch = synthetic_batch();

    c.bench_function("aggregate_10k_events", |b| {
        b.iter(|| aggregate(black_box(&batch)))
    });
}

fn bench_pairing(c: &mut Criterion) {
    let borrows: Vec<i64> = (0..1_000).map(|i| 1_600_000_000 + i * 3_600).rev().collect();
    let repays: Vec<i64> = (0..1_200).map(|i| 1_600_001_800 + i * 3_600).collect();

    c.bench_function("borrow_repay_gaps_1k", |b| {
        b.iter(|| borrow_repay_gaps(black_box(&borrows), black_box(&repays)))
    });
}

criterion_group!(benches, bench_aggregate, bench_pairing);
criterion_main!(benches);
