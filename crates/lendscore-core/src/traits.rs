//! Trait interfaces between crates:
//! - [`EventSource`] — where raw events come from (lendscore-pipeline implements for files)
//! - [`WalletScorer`] — statistics to score mapping (lendscore-scoring implements)

use std::collections::BTreeMap;

use crate::error::LoadError;
use crate::types::{EventBatch, ScoreRecord, WalletId, WalletStats};

/// Supplies a complete batch of events partitioned by kind.
pub trait EventSource {
    fn load(&self) -> Result<EventBatch, LoadError>;
}

/// An in-memory batch is its own source.
impl EventSource for EventBatch {
    fn load(&self) -> Result<EventBatch, LoadError> {
        Ok(self.clone())
    }
}

/// Maps one wallet's final statistics to a bounded, explained score.
///
/// Implementations must be pure: the score of a wallet depends only on its
/// own statistics, with no cross-wallet normalization.
pub trait WalletScorer: Send + Sync {
    fn score(&self, stats: &WalletStats) -> ScoreRecord;

    /// Score every wallet in the mapping.
    ///
    /// Default implementation calls [`score`](Self::score) per wallet.
    fn score_all(
        &self,
        wallets: &BTreeMap<WalletId, WalletStats>,
    ) -> BTreeMap<WalletId, ScoreRecord> {
        wallets
            .iter()
            .map(|(wallet, stats)| (wallet.clone(), self.score(stats)))
            .collect()
    }
}
