//! Heuristic scorer implementing the [`WalletScorer`] trait.

use lendscore_core::constants::{round_to, BASE_SCORE, MAX_SCORE, MIN_SCORE, ROUND_DECIMALS};
use lendscore_core::traits::WalletScorer;
use lendscore_core::types::{ScoreReason, ScoreRecord, WalletStats};
use tracing::trace;

use crate::rules::{Rule, RULES};

/// The production scorer: base score plus every applicable [`Rule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Rules that fire for `stats`, in evaluation order.
    pub fn fired_rules(&self, stats: &WalletStats) -> Vec<&'static Rule> {
        RULES.iter().filter(|rule| rule.applies(stats)).collect()
    }
}

impl WalletScorer for HeuristicScorer {
    fn score(&self, stats: &WalletStats) -> ScoreRecord {
        let fired = self.fired_rules(stats);

        let raw: f64 = BASE_SCORE + fired.iter().map(|rule| rule.delta).sum::<f64>();
        let score = round_to(raw.clamp(MIN_SCORE, MAX_SCORE), ROUND_DECIMALS);

        let mut reasons: Vec<ScoreReason> = fired.iter().map(|rule| rule.reason).collect();
        if reasons.is_empty() {
            reasons.push(ScoreReason::NothingNotable);
        }

        trace!(score, rules = fired.len(), "scoring: wallet scored");
        ScoreRecord { score, reasons }
    }
}
