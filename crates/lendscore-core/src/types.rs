//! Domain types: transaction events, wallet statistics and score records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::REASON_SEPARATOR;

/// Blockchain account identifier, the unit of scoring.
pub type WalletId = String;

/// The five lending-protocol event kinds.
///
/// # Examples
///
/// ```
/// use lendscore_core::types::TxKind;
/// assert_eq!(TxKind::Repay.bucket_name(), "repays");
/// assert_eq!(TxKind::from_bucket_name("liquidates"), Some(TxKind::Liquidate));
/// assert_eq!(TxKind::Liquidate.subject_relation(), "liquidatee");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
    Liquidate,
}

impl TxKind {
    /// Every kind, in bucket processing order.
    pub const ALL: [TxKind; 5] = [
        TxKind::Deposit,
        TxKind::Withdraw,
        TxKind::Borrow,
        TxKind::Repay,
        TxKind::Liquidate,
    ];

    /// Name of the bucket holding this kind in raw input files.
    pub fn bucket_name(&self) -> &'static str {
        match self {
            Self::Deposit => "deposits",
            Self::Withdraw => "withdraws",
            Self::Borrow => "borrows",
            Self::Repay => "repays",
            Self::Liquidate => "liquidates",
        }
    }

    pub fn from_bucket_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.bucket_name() == name)
    }

    /// Relation under which the subject wallet's `id` is nested.
    ///
    /// Liquidations are attributed to the liquidated party, never the liquidator.
    pub fn subject_relation(&self) -> &'static str {
        match self {
            Self::Liquidate => "liquidatee",
            _ => "account",
        }
    }

    /// Whether the event's amount feeds one of the running sums.
    pub fn carries_amount(&self) -> bool {
        !matches!(self, Self::Liquidate)
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
            Self::Liquidate => "liquidate",
        };
        f.write_str(name)
    }
}

/// One immutable transaction record after tolerant parsing.
///
/// Every field except `kind` may be absent; absence is handled by the
/// aggregator, never by raising an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxEvent {
    pub kind: TxKind,
    /// Subject wallet (the liquidatee for liquidations).
    pub wallet: Option<WalletId>,
    /// USD amount. Always `None` for liquidations.
    pub amount_usd: Option<f64>,
    /// Unix epoch seconds.
    pub timestamp: Option<i64>,
}

impl TxEvent {
    /// An event with no fields resolved yet.
    pub fn new(kind: TxKind) -> Self {
        Self {
            kind,
            wallet: None,
            amount_usd: None,
            timestamp: None,
        }
    }

    pub fn with_wallet(mut self, wallet: impl Into<WalletId>) -> Self {
        self.wallet = Some(wallet.into());
        self
    }

    pub fn with_amount(mut self, amount_usd: f64) -> Self {
        self.amount_usd = Some(amount_usd);
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The amount to add to a running sum, if any.
    ///
    /// Only strictly positive amounts on non-liquidation events count.
    pub fn countable_amount(&self) -> Option<f64> {
        if !self.kind.carries_amount() {
            return None;
        }
        self.amount_usd.filter(|a| *a > 0.0)
    }
}

/// Events partitioned by kind, each bucket in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    pub deposits: Vec<TxEvent>,
    pub withdraws: Vec<TxEvent>,
    pub borrows: Vec<TxEvent>,
    pub repays: Vec<TxEvent>,
    pub liquidates: Vec<TxEvent>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, kind: TxKind) -> &[TxEvent] {
        match kind {
            TxKind::Deposit => &self.deposits,
            TxKind::Withdraw => &self.withdraws,
            TxKind::Borrow => &self.borrows,
            TxKind::Repay => &self.repays,
            TxKind::Liquidate => &self.liquidates,
        }
    }

    fn bucket_mut(&mut self, kind: TxKind) -> &mut Vec<TxEvent> {
        match kind {
            TxKind::Deposit => &mut self.deposits,
            TxKind::Withdraw => &mut self.withdraws,
            TxKind::Borrow => &mut self.borrows,
            TxKind::Repay => &mut self.repays,
            TxKind::Liquidate => &mut self.liquidates,
        }
    }

    /// Append an event to the bucket matching its kind.
    pub fn push(&mut self, event: TxEvent) {
        self.bucket_mut(event.kind).push(event);
    }

    /// Append every bucket of `other` after the events already held.
    pub fn extend(&mut self, other: EventBatch) {
        let EventBatch {
            deposits,
            withdraws,
            borrows,
            repays,
            liquidates,
        } = other;
        self.deposits.extend(deposits);
        self.withdraws.extend(withdraws);
        self.borrows.extend(borrows);
        self.repays.extend(repays);
        self.liquidates.extend(liquidates);
    }

    /// Total number of events across all buckets.
    pub fn len(&self) -> usize {
        TxKind::ALL.iter().map(|k| self.bucket(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<TxEvent> for EventBatch {
    fn from_iter<I: IntoIterator<Item = TxEvent>>(iter: I) -> Self {
        let mut batch = EventBatch::new();
        for event in iter {
            batch.push(event);
        }
        batch
    }
}

/// Final per-wallet statistics.
///
/// Produced once by the aggregator's finalization pass and read-only
/// afterwards. Timestamp sequences keep arrival order; the derived fields
/// are computed from sorted copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletStats {
    pub total_deposit: f64,
    pub total_withdraw: f64,
    pub total_borrow: f64,
    pub total_repay: f64,
    pub liquidated: bool,
    pub timestamps: Vec<i64>,
    pub borrow_timestamps: Vec<i64>,
    pub repay_timestamps: Vec<i64>,
    pub first_activity: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    /// Whole days between first and last activity; 0 with fewer than two timestamps.
    pub active_days: i64,
    /// Mean borrow-to-repay latency in days, `None` when no valid pair exists.
    pub avg_borrow_to_repay_days: Option<f64>,
}

/// Why a score moved, one entry per fired rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreReason {
    HighRepayRatio,
    DepositsIntact,
    Liquidated,
    HighBorrowBalance,
    /// Placeholder when no rule fired.
    NothingNotable,
}

impl ScoreReason {
    pub const ALL: [ScoreReason; 5] = [
        ScoreReason::HighRepayRatio,
        ScoreReason::DepositsIntact,
        ScoreReason::Liquidated,
        ScoreReason::HighBorrowBalance,
        ScoreReason::NothingNotable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighRepayRatio => "High repay-to-borrow ratio",
            Self::DepositsIntact => "Keeps deposits mostly intact",
            Self::Liquidated => "Got liquidated",
            Self::HighBorrowBalance => "High borrow balance",
            Self::NothingNotable => "No notable positive/negative behaviors detected",
        }
    }

    /// Inverse of [`as_str`](Self::as_str), ignoring surrounding whitespace.
    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|r| r.as_str() == text)
    }
}

impl fmt::Display for ScoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wallet's bounded score and the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Clamped to `[MIN_SCORE, MAX_SCORE]` and rounded to two decimals.
    pub score: f64,
    /// Never empty; rule evaluation order.
    pub reasons: Vec<ScoreReason>,
}

impl ScoreRecord {
    /// Reasons flattened into the `reason_for_score` column format.
    ///
    /// # Examples
    ///
    /// ```
    /// use lendscore_core::types::{ScoreReason, ScoreRecord};
    /// let record = ScoreRecord {
    ///     score: 55.0,
    ///     reasons: vec![ScoreReason::DepositsIntact, ScoreReason::Liquidated],
    /// };
    /// assert_eq!(record.reason_text(), "Keeps deposits mostly intact; Got liquidated");
    /// ```
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(ScoreReason::as_str)
            .collect::<Vec<_>>()
            .join(REASON_SEPARATOR)
    }

    pub fn has_reason(&self, reason: ScoreReason) -> bool {
        self.reasons.contains(&reason)
    }
}
