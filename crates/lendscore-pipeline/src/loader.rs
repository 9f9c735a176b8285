//! JSON chunk loader.
//!
//! Lending-protocol exports arrive as several chunk files, each a JSON
//! object with the buckets `deposits`, `withdraws`, `borrows`, `repays`
//! and `liquidates`. Chunks are merged bucket by bucket in file order.
//!
//! Missing files are skipped with a warning. A file that exists but cannot
//! be read or parsed stops the run. Inside a file, absent buckets,
//! non-array buckets and malformed events never fail the load.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use lendscore_core::error::LoadError;
use lendscore_core::traits::EventSource;
use lendscore_core::types::{EventBatch, TxEvent, TxKind};

/// Extension of chunk files picked up from input directories.
const CHUNK_EXTENSION: &str = "json";

/// Loads and merges lending-protocol JSON chunk files.
#[derive(Debug, Clone)]
pub struct JsonChunkLoader {
    inputs: Vec<PathBuf>,
}

impl JsonChunkLoader {
    /// `inputs` may mix files and directories; order is preserved.
    pub fn new(inputs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Expand directories into their `*.json` files, sorted by name.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>, LoadError> {
        if self.inputs.is_empty() {
            return Err(LoadError::NoInputs);
        }

        let mut files = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                let mut chunks = chunk_files_in(input)?;
                debug!(dir = %input.display(), files = chunks.len(), "loader: expanded directory");
                files.append(&mut chunks);
            } else {
                files.push(input.clone());
            }
        }
        Ok(files)
    }
}

impl EventSource for JsonChunkLoader {
    fn load(&self) -> Result<EventBatch, LoadError> {
        let mut merged = EventBatch::new();
        let mut loaded = 0usize;

        for path in self.resolve_inputs()? {
            match load_chunk(&path)? {
                Some(batch) => {
                    merged.extend(batch);
                    loaded += 1;
                }
                None => warn!(path = %path.display(), "loader: input file not found, skipping"),
            }
        }

        info!(files = loaded, events = merged.len(), "loader: inputs merged");
        Ok(merged)
    }
}

fn chunk_files_in(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = fs::read_dir(dir).map_err(|e| LoadError::Unreadable {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == CHUNK_EXTENSION))
        .collect();
    files.sort();
    Ok(files)
}

/// Read one chunk file. Returns `Ok(None)` if the file does not exist.
pub fn load_chunk(path: &Path) -> Result<Option<EventBatch>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }

    let path_label = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|e| LoadError::Unreadable {
        path: path_label.clone(),
        reason: e.to_string(),
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::Malformed {
        path: path_label.clone(),
        reason: e.to_string(),
    })?;

    let batch = parse_chunk(&value).ok_or(LoadError::NotAnObject(path_label.clone()))?;
    debug!(
        path = %path_label,
        deposits = batch.deposits.len(),
        withdraws = batch.withdraws.len(),
        borrows = batch.borrows.len(),
        repays = batch.repays.len(),
        liquidates = batch.liquidates.len(),
        "loader: chunk parsed"
    );
    Ok(Some(batch))
}

/// Turn one parsed chunk into an event batch.
///
/// Returns `None` only when the top-level value is not an object.
pub fn parse_chunk(value: &Value) -> Option<EventBatch> {
    let object = value.as_object()?;
    let mut batch = EventBatch::new();

    for kind in TxKind::ALL {
        let name = kind.bucket_name();
        match object.get(name) {
            None | Some(Value::Null) => {}
            Some(Value::Array(events)) => {
                for raw in events {
                    batch.push(TxEvent::from_json(kind, raw));
                }
            }
            Some(_) => warn!(bucket = name, "loader: bucket is not an array, ignoring"),
        }
    }

    Some(batch)
}
