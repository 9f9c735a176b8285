//! Shared fixture builders for end-to-end tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};

use lendscore_core::types::TxKind;
use lendscore_pipeline::PipelineConfig;

/// One raw event as the subgraph exports it: amounts and timestamps are strings.
pub fn raw_event(kind: TxKind, wallet: &str, amount_usd: f64, timestamp: i64) -> Value {
    if kind == TxKind::Liquidate {
        return json!({
            "liquidatee": {"id": wallet},
            "liquidator": {"id": "0xliquidator"},
            "amountUSD": amount_usd.to_string(),
            "timestamp": timestamp.to_string(),
        });
    }
    json!({
        "account": {"id": wallet},
        "amountUSD": amount_usd.to_string(),
        "timestamp": timestamp.to_string(),
    })
}

/// Builds one chunk file's worth of events.
#[derive(Debug, Default, Clone)]
pub struct ChunkBuilder {
    buckets: Map<String, Value>,
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, kind: TxKind, wallet: &str, amount_usd: f64, timestamp: i64) -> Self {
        let bucket = self
            .buckets
            .entry(kind.bucket_name())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(events) = bucket {
            events.push(raw_event(kind, wallet, amount_usd, timestamp));
        }
        self
    }

    pub fn deposit(self, wallet: &str, amount_usd: f64, timestamp: i64) -> Self {
        self.event(TxKind::Deposit, wallet, amount_usd, timestamp)
    }

    pub fn withdraw(self, wallet: &str, amount_usd: f64, timestamp: i64) -> Self {
        self.event(TxKind::Withdraw, wallet, amount_usd, timestamp)
    }

    pub fn borrow(self, wallet: &str, amount_usd: f64, timestamp: i64) -> Self {
        self.event(TxKind::Borrow, wallet, amount_usd, timestamp)
    }

    pub fn repay(self, wallet: &str, amount_usd: f64, timestamp: i64) -> Self {
        self.event(TxKind::Repay, wallet, amount_usd, timestamp)
    }

    pub fn liquidate(self, wallet: &str, timestamp: i64) -> Self {
        self.event(TxKind::Liquidate, wallet, 0.0, timestamp)
    }

    pub fn build(self) -> Value {
        Value::Object(self.buckets)
    }

    /// Write the chunk as `dir/name` and return its path.
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_vec_pretty(&self.build()).unwrap()).unwrap();
        path
    }
}

/// Config reading `inputs` and writing under `dir/out`.
pub fn config_for(dir: &Path, inputs: Vec<PathBuf>) -> PipelineConfig {
    PipelineConfig {
        inputs,
        output_dir: dir.join("out"),
        ..PipelineConfig::default()
    }
}

/// The behaviour-table row for `wallet`, split into cells with quotes removed.
pub fn behavior_row(table: &str, wallet: &str) -> Option<Vec<String>> {
    let line = table
        .lines()
        .find(|l| l.split(',').next() == Some(wallet))?;
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for ch in line.chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);
    Some(cells)
}
