//! Aggregate figures over a scored run.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use lendscore_core::constants::{round_to, ROUND_DECIMALS};
use lendscore_core::types::{ScoreReason, ScoreRecord, WalletId, WalletStats};

use crate::report::ScoreRow;

/// Headline numbers for one run, or for a score table read back from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub wallets: usize,
    /// Mean over wallets with a numeric score, rounded to two decimals.
    pub average_score: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub liquidated_wallets: usize,
    /// How many wallets each reason fired for.
    pub reason_counts: BTreeMap<ScoreReason, usize>,
    /// Only known when per-wallet statistics are at hand.
    pub max_total_deposit: Option<f64>,
}

impl RunSummary {
    pub fn from_records(scores: &BTreeMap<WalletId, ScoreRecord>) -> Self {
        Self::collect(
            scores
                .values()
                .map(|record| (Some(record.score), record.reasons.clone())),
        )
    }

    /// Rows without a numeric score still count as wallets.
    pub fn from_rows(rows: &[ScoreRow]) -> Self {
        Self::collect(rows.iter().map(|row| (row.score, row.reasons())))
    }

    pub fn with_stats(mut self, stats: &BTreeMap<WalletId, WalletStats>) -> Self {
        self.max_total_deposit = stats.values().map(|s| s.total_deposit).reduce(f64::max);
        self
    }

    fn collect(entries: impl Iterator<Item = (Option<f64>, Vec<ScoreReason>)>) -> Self {
        let mut summary = Self::default();
        let mut total = 0.0;
        let mut scored = 0usize;

        for (score, reasons) in entries {
            summary.wallets += 1;
            if let Some(score) = score {
                total += score;
                scored += 1;
                summary.min_score = Some(summary.min_score.map_or(score, |m| m.min(score)));
                summary.max_score = Some(summary.max_score.map_or(score, |m| m.max(score)));
            }
            if reasons.contains(&ScoreReason::Liquidated) {
                summary.liquidated_wallets += 1;
            }
            for reason in reasons {
                *summary.reason_counts.entry(reason).or_default() += 1;
            }
        }

        if scored > 0 {
            summary.average_score = Some(round_to(total / scored as f64, ROUND_DECIMALS));
        }
        summary
    }
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "wallets scored:     {}", self.wallets)?;
        writeln!(f, "average score:      {}", or_na(self.average_score))?;
        writeln!(
            f,
            "score range:        {} .. {}",
            or_na(self.min_score),
            or_na(self.max_score)
        )?;
        writeln!(f, "liquidated wallets: {}", self.liquidated_wallets)?;
        if let Some(deposit) = self.max_total_deposit {
            writeln!(f, "max total deposit:  {deposit:.2} USD")?;
        }
        write!(f, "reasons:")?;
        if self.reason_counts.is_empty() {
            write!(f, " none")?;
        }
        for (reason, count) in &self.reason_counts {
            write!(f, "\n  {reason}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f64, reasons: &[ScoreReason]) -> ScoreRecord {
        ScoreRecord {
            score,
            reasons: reasons.to_vec(),
        }
    }

    fn sample() -> BTreeMap<WalletId, ScoreRecord> {
        let mut scores = BTreeMap::new();
        scores.insert(
            "0xa".to_string(),
            record(85.0, &[ScoreReason::HighRepayRatio, ScoreReason::DepositsIntact]),
        );
        scores.insert(
            "0xb".to_string(),
            record(55.0, &[ScoreReason::DepositsIntact, ScoreReason::Liquidated]),
        );
        scores.insert("0xc".to_string(), record(50.0, &[ScoreReason::NothingNotable]));
        scores
    }

    #[test]
    fn figures_from_records() {
        let summary = RunSummary::from_records(&sample());
        assert_eq!(summary.wallets, 3);
        assert_eq!(summary.average_score, Some(63.33));
        assert_eq!(summary.min_score, Some(50.0));
        assert_eq!(summary.max_score, Some(85.0));
        assert_eq!(summary.liquidated_wallets, 1);
        assert_eq!(summary.reason_counts[&ScoreReason::DepositsIntact], 2);
        assert_eq!(summary.reason_counts[&ScoreReason::NothingNotable], 1);
        assert!(!summary.reason_counts.contains_key(&ScoreReason::HighBorrowBalance));
        assert_eq!(summary.max_total_deposit, None);
    }

    #[test]
    fn empty_run() {
        let summary = RunSummary::from_records(&BTreeMap::new());
        assert_eq!(summary, RunSummary::default());
        assert!(summary.to_string().contains("average score:      n/a"));
    }

    #[test]
    fn rows_without_score_still_counted() {
        let rows = vec![
            ScoreRow {
                wallet: "0xa".to_string(),
                score: None,
                reason_for_score: "Got liquidated".to_string(),
            },
            ScoreRow {
                wallet: "0xb".to_string(),
                score: Some(40.0),
                reason_for_score: "High borrow balance".to_string(),
            },
        ];
        let summary = RunSummary::from_rows(&rows);
        assert_eq!(summary.wallets, 2);
        assert_eq!(summary.average_score, Some(40.0));
        assert_eq!(summary.liquidated_wallets, 1);
    }

    #[test]
    fn stats_add_max_deposit() {
        let mut stats = BTreeMap::new();
        for (wallet, deposit) in [("0xa", 1000.0), ("0xb", 250.5)] {
            stats.insert(
                wallet.to_string(),
                WalletStats {
                    total_deposit: deposit,
                    ..WalletStats::default()
                },
            );
        }
        let summary = RunSummary::from_records(&sample()).with_stats(&stats);
        assert_eq!(summary.max_total_deposit, Some(1000.0));
        assert!(summary.to_string().contains("max total deposit:  1000.00 USD"));
    }

    #[test]
    fn display_lists_reasons() {
        let text = RunSummary::from_records(&sample()).to_string();
        assert!(text.contains("wallets scored:     3"));
        assert!(text.contains("score range:        50.00 .. 85.00"));
        assert!(text.contains("  Got liquidated: 1"));
    }

    #[test]
    fn serializes_to_json() {
        let value = serde_json::to_value(RunSummary::from_records(&sample())).unwrap();
        assert_eq!(value["wallets"], 3);
        assert_eq!(value["reason_counts"]["deposits_intact"], 2);
    }
}
