//! Mutable per-wallet builder, consumed once into [`WalletStats`].

use lendscore_core::types::{TxEvent, TxKind, WalletStats};

use crate::timing::{activity_window, avg_borrow_to_repay_days};

/// Running totals and timestamp sequences for one wallet.
///
/// Sums only grow and the liquidation flag is only ever set, never cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletAccumulator {
    total_deposit: f64,
    total_withdraw: f64,
    total_borrow: f64,
    total_repay: f64,
    liquidated: bool,
    timestamps: Vec<i64>,
    borrow_timestamps: Vec<i64>,
    repay_timestamps: Vec<i64>,
}

impl WalletAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the accumulator.
    ///
    /// The caller has already resolved the event's wallet to this accumulator.
    pub fn apply(&mut self, event: &TxEvent) {
        if let Some(amount) = event.countable_amount() {
            match event.kind {
                TxKind::Deposit => self.total_deposit += amount,
                TxKind::Withdraw => self.total_withdraw += amount,
                TxKind::Borrow => self.total_borrow += amount,
                TxKind::Repay => self.total_repay += amount,
                TxKind::Liquidate => {}
            }
        }

        if event.kind == TxKind::Liquidate {
            self.liquidated = true;
        }

        if let Some(ts) = event.timestamp {
            self.timestamps.push(ts);
            match event.kind {
                TxKind::Borrow => self.borrow_timestamps.push(ts),
                TxKind::Repay => self.repay_timestamps.push(ts),
                _ => {}
            }
        }
    }

    pub fn is_liquidated(&self) -> bool {
        self.liquidated
    }

    pub fn event_timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Compute the derived fields and freeze the wallet's statistics.
    pub fn finalize(self) -> WalletStats {
        let window = activity_window(&self.timestamps);
        let avg_borrow_to_repay_days =
            avg_borrow_to_repay_days(&self.borrow_timestamps, &self.repay_timestamps);

        WalletStats {
            total_deposit: self.total_deposit,
            total_withdraw: self.total_withdraw,
            total_borrow: self.total_borrow,
            total_repay: self.total_repay,
            liquidated: self.liquidated,
            timestamps: self.timestamps,
            borrow_timestamps: self.borrow_timestamps,
            repay_timestamps: self.repay_timestamps,
            first_activity: window.first,
            last_activity: window.last,
            active_days: window.active_days,
            avg_borrow_to_repay_days,
        }
    }
}
