//! One scoring run: load → aggregate → score → write.

use std::collections::BTreeMap;
use std::fs;

use tracing::info;

use lendscore_aggregate::{Aggregator, IngestReport};
use lendscore_core::error::{LendscoreError, LoadError, ReportError};
use lendscore_core::traits::{EventSource, WalletScorer};
use lendscore_core::types::{ScoreRecord, WalletId, WalletStats};
use lendscore_scoring::HeuristicScorer;

use crate::config::PipelineConfig;
use crate::loader::JsonChunkLoader;
use crate::report::{write_behavior_csv, write_scores_csv};
use crate::summary::RunSummary;

/// Everything a run produced, before or after it was written out.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stats: BTreeMap<WalletId, WalletStats>,
    pub scores: BTreeMap<WalletId, ScoreRecord>,
    pub summary: RunSummary,
    pub report: IngestReport,
}

pub struct Pipeline {
    config: PipelineConfig,
    scorer: Box<dyn WalletScorer>,
}

impl Pipeline {
    /// Pipeline using the heuristic scorer.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_scorer(config, Box::new(HeuristicScorer::new()))
    }

    pub fn with_scorer(config: PipelineConfig, scorer: Box<dyn WalletScorer>) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Aggregate and score whatever `source` yields. Writes nothing.
    pub fn evaluate(&self, source: &dyn EventSource) -> Result<RunOutput, LoadError> {
        let batch = source.load()?;

        let mut aggregator = Aggregator::new();
        aggregator.ingest_batch(&batch);
        let report = aggregator.report().clone();
        let stats = aggregator.finalize();

        let scores = self.scorer.score_all(&stats);
        let summary = RunSummary::from_records(&scores).with_stats(&stats);

        Ok(RunOutput {
            stats,
            scores,
            summary,
            report,
        })
    }

    /// Load the configured inputs, score them and write both tables.
    pub fn run(&self) -> Result<RunOutput, LendscoreError> {
        let loader = JsonChunkLoader::new(self.config.inputs.iter().cloned());
        let output = self.evaluate(&loader)?;
        self.write(&output)?;

        info!(
            wallets = output.summary.wallets,
            average_score = ?output.summary.average_score,
            liquidated = output.summary.liquidated_wallets,
            "pipeline: run complete"
        );
        Ok(output)
    }

    /// Write the behaviour and score tables under the configured output dir.
    pub fn write(&self, output: &RunOutput) -> Result<(), ReportError> {
        let dir = &self.config.output_dir;
        fs::create_dir_all(dir).map_err(|e| ReportError::Write {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        write_behavior_csv(&self.config.behavior_path(), &output.stats)?;
        write_scores_csv(&self.config.scores_path(), &output.scores)?;
        Ok(())
    }
}
