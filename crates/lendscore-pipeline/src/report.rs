//! CSV tables handed to downstream consumers.
//!
//! - wallet behaviour table: every [`WalletStats`] field, one row per wallet
//! - wallet score table: `wallet,score,reason_for_score`
//!
//! Rows are written in wallet-id order. Empty cells stand for absent values.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::info;

use lendscore_core::error::ReportError;
use lendscore_core::parse::{parse_decimal, parse_flag};
use lendscore_core::types::{ScoreReason, ScoreRecord, WalletId, WalletStats};

pub const BEHAVIOR_HEADER: [&str; 13] = [
    "wallet",
    "total_deposit",
    "total_withdraw",
    "total_borrow",
    "total_repay",
    "liquidated",
    "timestamps",
    "borrow_timestamps",
    "repay_timestamps",
    "first_activity",
    "last_activity",
    "active_days",
    "avg_borrow_to_repay_days",
];

pub const SCORES_HEADER: [&str; 3] = ["wallet", "score", "reason_for_score"];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format(DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

fn format_list(values: &[i64]) -> String {
    let items: Vec<String> = values.iter().map(i64::to_string).collect();
    format!("[{}]", items.join(","))
}

fn parse_time(cell: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(cell.trim(), DATETIME_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

fn parse_list(cell: &str) -> Vec<i64> {
    serde_json::from_str(cell).unwrap_or_default()
}

fn write_err(path: &Path, err: impl ToString) -> ReportError {
    ReportError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn read_err(path: &Path, err: impl ToString) -> ReportError {
    read_fail(&path.display().to_string(), err)
}

fn read_fail(source: &str, err: impl ToString) -> ReportError {
    ReportError::Read {
        path: source.to_string(),
        reason: err.to_string(),
    }
}

fn locate(headers: &csv::StringRecord, name: &str, source: &str) -> Result<usize, ReportError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ReportError::MissingColumn {
            path: source.to_string(),
            column: name.to_string(),
        })
}

fn header_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

/// Write the wallet behaviour table to any writer.
pub fn write_behavior<W: Write>(
    writer: W,
    stats: &BTreeMap<WalletId, WalletStats>,
) -> csv::Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(BEHAVIOR_HEADER)?;
    for (wallet, s) in stats {
        w.write_record([
            wallet.clone(),
            s.total_deposit.to_string(),
            s.total_withdraw.to_string(),
            s.total_borrow.to_string(),
            s.total_repay.to_string(),
            s.liquidated.to_string(),
            format_list(&s.timestamps),
            format_list(&s.borrow_timestamps),
            format_list(&s.repay_timestamps),
            format_time(s.first_activity),
            format_time(s.last_activity),
            s.active_days.to_string(),
            s.avg_borrow_to_repay_days
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Write the wallet score table to any writer.
pub fn write_scores<W: Write>(
    writer: W,
    scores: &BTreeMap<WalletId, ScoreRecord>,
) -> csv::Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(SCORES_HEADER)?;
    for (wallet, record) in scores {
        w.write_record([
            wallet.as_str(),
            record.score.to_string().as_str(),
            record.reason_text().as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_behavior_csv(
    path: &Path,
    stats: &BTreeMap<WalletId, WalletStats>,
) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| write_err(path, e))?;
    write_behavior(file, stats).map_err(|e| write_err(path, e))?;
    info!(path = %path.display(), rows = stats.len(), "report: behaviour table written");
    Ok(())
}

pub fn write_scores_csv(
    path: &Path,
    scores: &BTreeMap<WalletId, ScoreRecord>,
) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| write_err(path, e))?;
    write_scores(file, scores).map_err(|e| write_err(path, e))?;
    info!(path = %path.display(), rows = scores.len(), "report: score table written");
    Ok(())
}

/// One row of a previously written score table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub wallet: WalletId,
    /// `None` when the cell is empty or not a number.
    pub score: Option<f64>,
    pub reason_for_score: String,
}

impl ScoreRow {
    /// Known reasons in the row, in column order. Unrecognised text is skipped.
    pub fn reasons(&self) -> Vec<ScoreReason> {
        self.reason_for_score
            .split(';')
            .filter_map(ScoreReason::from_text)
            .collect()
    }
}

/// Read a score table from any reader.
///
/// Columns are located by header name, so extra or reordered columns
/// (for instance a downstream `ml_predicted_score`) are fine. Rows with an
/// empty wallet are skipped.
pub fn read_scores<R: Read>(reader: R, source: &str) -> Result<Vec<ScoreRow>, ReportError> {
    let mut rdr = header_reader(reader);
    let headers = rdr.headers().map_err(|e| read_fail(source, e))?.clone();
    let wallet_col = locate(&headers, "wallet", source)?;
    let score_col = locate(&headers, "score", source)?;
    let reason_col = locate(&headers, "reason_for_score", source)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| read_fail(source, e))?;
        let wallet = record.get(wallet_col).unwrap_or_default();
        if wallet.is_empty() {
            continue;
        }
        rows.push(ScoreRow {
            wallet: wallet.to_string(),
            score: record.get(score_col).and_then(parse_decimal),
            reason_for_score: record.get(reason_col).unwrap_or_default().to_string(),
        });
    }
    Ok(rows)
}

pub fn read_scores_csv(path: &Path) -> Result<Vec<ScoreRow>, ReportError> {
    let file = std::fs::File::open(path).map_err(|e| read_err(path, e))?;
    read_scores(file, &path.display().to_string())
}

/// Read a behaviour table back into per-wallet statistics.
///
/// The `liquidated` cell is coerced the way the downstream trainer does it:
/// `true`/`false`, `1`/`0` and `yes`/`no` are understood, anything else
/// reads as not liquidated. Malformed sums read as 0, malformed lists as
/// empty, malformed dates and latencies as absent.
pub fn read_behavior<R: Read>(
    reader: R,
    source: &str,
) -> Result<BTreeMap<WalletId, WalletStats>, ReportError> {
    let mut rdr = header_reader(reader);
    let headers = rdr.headers().map_err(|e| read_fail(source, e))?.clone();
    let mut cols = [0usize; BEHAVIOR_HEADER.len()];
    for (col, name) in cols.iter_mut().zip(BEHAVIOR_HEADER) {
        *col = locate(&headers, name, source)?;
    }

    let mut stats = BTreeMap::new();
    for record in rdr.records() {
        let record = record.map_err(|e| read_fail(source, e))?;
        let cell = |i: usize| record.get(cols[i]).unwrap_or_default();
        let sum = |i: usize| parse_decimal(cell(i)).unwrap_or(0.0);

        let wallet = cell(0);
        if wallet.is_empty() {
            continue;
        }
        stats.insert(
            wallet.to_string(),
            WalletStats {
                total_deposit: sum(1),
                total_withdraw: sum(2),
                total_borrow: sum(3),
                total_repay: sum(4),
                liquidated: parse_flag(cell(5)).unwrap_or(false),
                timestamps: parse_list(cell(6)),
                borrow_timestamps: parse_list(cell(7)),
                repay_timestamps: parse_list(cell(8)),
                first_activity: parse_time(cell(9)),
                last_activity: parse_time(cell(10)),
                active_days: cell(11).trim().parse().unwrap_or(0),
                avg_borrow_to_repay_days: parse_decimal(cell(12)),
            },
        );
    }
    Ok(stats)
}

pub fn read_behavior_csv(path: &Path) -> Result<BTreeMap<WalletId, WalletStats>, ReportError> {
    let file = std::fs::File::open(path).map_err(|e| read_err(path, e))?;
    read_behavior(file, &path.display().to_string())
}
