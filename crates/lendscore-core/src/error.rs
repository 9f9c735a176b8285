//! Error types for lendscore.
//!
//! Per-record data quality problems are never errors: absent fields and
//! unresolvable wallets are skipped during ingestion. These enums only
//! cover the I/O boundary and configuration.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no input files given")] NoInputs,
    #[error("cannot read {path}: {reason}")] Unreadable { path: String, reason: String },
    #[error("cannot parse {path}: {reason}")] Malformed { path: String, reason: String },
    #[error("top-level value in {0} is not a JSON object")] NotAnObject(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("cannot write {path}: {reason}")] Write { path: String, reason: String },
    #[error("cannot read {path}: {reason}")] Read { path: String, reason: String },
    #[error("missing column {column} in {path}")] MissingColumn { path: String, column: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")] Invalid(String),
    #[error("unknown log format: {0} (expected \"text\" or \"json\")")] UnknownLogFormat(String),
}

#[derive(Error, Debug)]
pub enum LendscoreError {
    #[error(transparent)] Load(#[from] LoadError),
    #[error(transparent)] Report(#[from] ReportError),
    #[error(transparent)] Config(#[from] ConfigError),
}
