//! # lendscore-pipeline — loading, reporting and end-to-end runs.
//!
//! # Modules
//!
//! - [`config`] — `PipelineConfig`, layered from defaults, a TOML file and `LENDSCORE_*` env vars
//! - [`loader`] — merges JSON chunk files into one `EventBatch`
//! - [`report`] — wallet behaviour and wallet score CSV tables
//! - [`summary`] — aggregate figures over a scored run
//! - [`pipeline`] — load → aggregate → score → write

pub mod config;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod summary;

pub use crate::config::{LogFormat, PipelineConfig};
pub use loader::JsonChunkLoader;
pub use pipeline::{Pipeline, RunOutput};
pub use report::ScoreRow;
pub use summary::RunSummary;
