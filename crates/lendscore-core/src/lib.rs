//! # lendscore-core
//! Foundation types and traits shared by the lendscore crates.
//!
//! - [`types`] — transaction events, event batches, wallet statistics, score records
//! - [`parse`] — tolerant field accessors for raw, loosely-shaped event JSON
//! - [`traits`] — [`WalletScorer`](traits::WalletScorer) and [`EventSource`](traits::EventSource)
//! - [`error`] — error enums for the I/O boundary
//! - [`constants`] — scoring weights, thresholds and output defaults

pub mod constants;
pub mod error;
pub mod parse;
pub mod traits;
pub mod types;

pub use error::LendscoreError;
pub use types::{EventBatch, ScoreReason, ScoreRecord, TxEvent, TxKind, WalletId, WalletStats};
