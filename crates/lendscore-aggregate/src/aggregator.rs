//! Event ingestion into per-wallet accumulators and the finalization pass.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use lendscore_core::types::{EventBatch, TxEvent, TxKind, WalletId, WalletStats};

use crate::accumulator::WalletAccumulator;

/// Counters describing what ingestion did with the events it was given.
///
/// None of these are errors: events without a wallet are dropped and
/// missing fields are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Events applied to a wallet, per kind.
    pub applied: BTreeMap<TxKind, usize>,
    /// Events dropped because no wallet could be resolved.
    pub missing_wallet: usize,
    /// Applied amount-carrying events that did not add to a sum.
    pub uncounted_amount: usize,
    /// Applied events without a usable timestamp.
    pub missing_timestamp: usize,
}

impl IngestReport {
    pub fn total_applied(&self) -> usize {
        self.applied.values().sum()
    }
}

/// Builds wallet statistics from transaction events.
///
/// # Usage
///
/// Feed events with [`Aggregator::ingest`] or [`Aggregator::ingest_batch`],
/// then call [`Aggregator::finalize`] once to obtain the read-only
/// statistics for every wallet seen.
#[derive(Debug, Default)]
pub struct Aggregator {
    wallets: BTreeMap<WalletId, WalletAccumulator>,
    report: IngestReport,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event to its subject wallet, creating the wallet on first
    /// reference. Returns `false` if the event had no wallet and was dropped.
    pub fn ingest(&mut self, event: &TxEvent) -> bool {
        let Some(wallet) = event.wallet.as_deref() else {
            self.report.missing_wallet += 1;
            debug!(kind = %event.kind, "aggregate: dropping event without wallet");
            return false;
        };

        if event.kind.carries_amount() && event.countable_amount().is_none() {
            self.report.uncounted_amount += 1;
        }
        if event.timestamp.is_none() {
            self.report.missing_timestamp += 1;
        }

        // Avoid allocating the key for wallets already tracked.
        match self.wallets.get_mut(wallet) {
            Some(acc) => acc.apply(event),
            None => {
                let mut acc = WalletAccumulator::new();
                acc.apply(event);
                self.wallets.insert(wallet.to_string(), acc);
            }
        }

        *self.report.applied.entry(event.kind).or_insert(0) += 1;
        true
    }

    /// Ingest every bucket of a batch, kind by kind, in arrival order.
    pub fn ingest_batch(&mut self, batch: &EventBatch) {
        for kind in TxKind::ALL {
            let bucket = batch.bucket(kind);
            for event in bucket {
                self.ingest(event);
            }
            debug!(%kind, events = bucket.len(), "aggregate: bucket ingested");
        }
    }

    /// Number of distinct wallets seen so far.
    pub fn wallet_count(&self) -> usize {
        self.wallets.len()
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    /// Run the finalization pass over every wallet.
    pub fn finalize(self) -> BTreeMap<WalletId, WalletStats> {
        info!(
            wallets = self.wallets.len(),
            applied = self.report.total_applied(),
            missing_wallet = self.report.missing_wallet,
            uncounted_amount = self.report.uncounted_amount,
            missing_timestamp = self.report.missing_timestamp,
            "aggregate: finalizing wallet statistics"
        );

        self.wallets
            .into_iter()
            .map(|(wallet, acc)| (wallet, acc.finalize()))
            .collect()
    }
}

/// Aggregate a whole batch in one call.
pub fn aggregate(batch: &EventBatch) -> BTreeMap<WalletId, WalletStats> {
    let mut aggregator = Aggregator::new();
    aggregator.ingest_batch(batch);
    aggregator.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ev(kind: TxKind, wallet: &str) -> TxEvent {
        TxEvent::new(kind).with_wallet(wallet)
    }

    #[test]
    fn one_record_per_wallet() {
        let batch: EventBatch = vec![
            ev(TxKind::Deposit, "a").with_amount(10.0),
            ev(TxKind::Deposit, "b").with_amount(10.0),
            ev(TxKind::Borrow, "a").with_amount(4.0),
            ev(TxKind::Repay, "a").with_amount(4.0),
        ]
        .into_iter()
        .collect();

        let stats = aggregate(&batch);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["a"].total_deposit, 10.0);
        assert_eq!(stats["a"].total_borrow, 4.0);
        assert_eq!(stats["b"].total_deposit, 10.0);
    }

    #[test]
    fn events_without_wallet_are_dropped() {
        let mut aggregator = Aggregator::new();
        assert!(!aggregator.ingest(&TxEvent::new(TxKind::Deposit).with_amount(5.0)));
        assert!(!aggregator.ingest(&TxEvent::new(TxKind::Liquidate).with_timestamp(7)));
        assert_eq!(aggregator.wallet_count(), 0);
        assert_eq!(aggregator.report().missing_wallet, 2);
        assert!(aggregator.finalize().is_empty());
    }

    #[test]
    fn liquidation_only_wallet_gets_full_record() {
        let batch: EventBatch = std::iter::once(ev(TxKind::Liquidate, "victim").with_timestamp(1_000))
            .collect();
        let stats = aggregate(&batch);
        let victim = &stats["victim"];
        assert!(victim.liquidated);
        assert_eq!(victim.total_deposit, 0.0);
        assert_eq!(victim.total_withdraw, 0.0);
        assert_eq!(victim.total_borrow, 0.0);
        assert_eq!(victim.total_repay, 0.0);
        assert_eq!(victim.timestamps, vec![1_000]);
        assert_eq!(victim.active_days, 0);
    }

    #[test]
    fn zero_amount_event_still_registers_wallet() {
        let batch: EventBatch = std::iter::once(ev(TxKind::Withdraw, "w").with_amount(0.0)).collect();
        let mut aggregator = Aggregator::new();
        aggregator.ingest_batch(&batch);
        assert_eq!(aggregator.report().uncounted_amount, 1);
        assert_eq!(aggregator.report().missing_timestamp, 1);

        let stats = aggregator.finalize();
        assert_eq!(stats["w"].total_withdraw, 0.0);
    }

    #[test]
    fn extreme_timestamps_do_not_panic() {
        let batch: EventBatch = vec![
            ev(TxKind::Borrow, "edge").with_amount(5.0).with_timestamp(i64::MIN + 1),
            ev(TxKind::Repay, "edge").with_amount(5.0).with_timestamp(i64::MAX),
        ]
        .into_iter()
        .collect();

        let stats = aggregate(&batch);
        let edge = &stats["edge"];
        assert_eq!(edge.total_borrow, 5.0);
        assert_eq!(edge.total_repay, 5.0);
        assert_eq!(edge.timestamps, vec![i64::MIN + 1, i64::MAX]);
        assert_eq!(edge.avg_borrow_to_repay_days, None);
        assert_eq!(edge.first_activity, None);
        assert_eq!(edge.active_days, 0);
    }

    #[test]
    fn report_counts_applied_per_kind() {
        let batch: EventBatch = vec![
            ev(TxKind::Borrow, "a").with_amount(1.0).with_timestamp(1),
            ev(TxKind::Borrow, "b").with_amount(1.0).with_timestamp(1),
            ev(TxKind::Liquidate, "a"),
        ]
        .into_iter()
        .collect();

        let mut aggregator = Aggregator::new();
        aggregator.ingest_batch(&batch);
        let report = aggregator.report();
        assert_eq!(report.applied.get(&TxKind::Borrow), Some(&2));
        assert_eq!(report.applied.get(&TxKind::Liquidate), Some(&1));
        assert_eq!(report.total_applied(), 3);
        // Liquidations carry no amount, so only the missing timestamp counts.
        assert_eq!(report.uncounted_amount, 0);
        assert_eq!(report.missing_timestamp, 1);
    }

    #[test]
    fn borrow_repay_latency_across_buckets() {
        let batch: EventBatch = vec![
            ev(TxKind::Borrow, "a").with_amount(1.0).with_timestamp(100),
            ev(TxKind::Borrow, "a").with_amount(1.0).with_timestamp(200),
            ev(TxKind::Repay, "a").with_amount(1.0).with_timestamp(150),
            ev(TxKind::Repay, "a").with_amount(1.0).with_timestamp(500),
        ]
        .into_iter()
        .collect();

        let stats = aggregate(&batch);
        assert_eq!(stats["a"].avg_borrow_to_repay_days, Some(0.0));
        assert_eq!(stats["a"].timestamps, vec![100, 200, 150, 500]);
    }

    fn arb_event() -> impl Strategy<Value = TxEvent> {
        (
            prop::sample::select(TxKind::ALL.to_vec()),
            prop::option::of(prop::sample::select(vec!["a", "b", "c", "d"])),
            prop::option::of(0.0f64..1e9),
            prop::option::of(1i64..2_000_000_000),
        )
            .prop_map(|(kind, wallet, amount, ts)| TxEvent {
                kind,
                wallet: wallet.map(str::to_string),
                amount_usd: amount,
                timestamp: ts,
            })
    }

    proptest! {
        #[test]
        fn aggregation_is_idempotent(events in prop::collection::vec(arb_event(), 0..60)) {
            let batch: EventBatch = events.into_iter().collect();
            prop_assert_eq!(aggregate(&batch), aggregate(&batch));
        }

        #[test]
        fn every_resolvable_wallet_has_one_record(events in prop::collection::vec(arb_event(), 0..60)) {
            let batch: EventBatch = events.clone().into_iter().collect();
            let stats = aggregate(&batch);
            let mut expected: Vec<&str> = events.iter().filter_map(|e| e.wallet.as_deref()).collect();
            expected.sort_unstable();
            expected.dedup();
            let got: Vec<&str> = stats.keys().map(String::as_str).collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn liquidated_iff_some_liquidation(events in prop::collection::vec(arb_event(), 0..60)) {
            let batch: EventBatch = events.clone().into_iter().collect();
            for (wallet, stats) in aggregate(&batch) {
                let hit = events.iter().any(|e| {
                    e.kind == TxKind::Liquidate && e.wallet.as_deref() == Some(wallet.as_str())
                });
                prop_assert_eq!(stats.liquidated, hit);
            }
        }

        #[test]
        fn sums_are_non_negative(events in prop::collection::vec(arb_event(), 0..60)) {
            let batch: EventBatch = events.into_iter().collect();
            for stats in aggregate(&batch).values() {
                prop_assert!(stats.total_deposit >= 0.0);
                prop_assert!(stats.total_withdraw >= 0.0);
                prop_assert!(stats.total_borrow >= 0.0);
                prop_assert!(stats.total_repay >= 0.0);
            }
        }
    }
}
