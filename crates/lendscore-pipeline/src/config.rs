//! Pipeline configuration.
//!
//! [`PipelineConfig`] has usable defaults for every field. Values are layered
//! as: defaults → optional TOML file → `LENDSCORE_*` environment variables;
//! the binary applies its CLI flags on top.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use lendscore_core::constants::{DEFAULT_BEHAVIOR_FILE, DEFAULT_SCORES_FILE, ENV_PREFIX};
use lendscore_core::error::ConfigError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line, for log aggregation pipelines.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Configuration for one scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// JSON chunk files or directories of them, merged in order.
    pub inputs: Vec<PathBuf>,
    /// Directory both output tables are written to.
    pub output_dir: PathBuf,
    /// File name of the wallet behaviour table.
    pub behavior_file: String,
    /// File name of the wallet score table.
    pub scores_file: String,
    /// Log level filter string (e.g. "info", "debug", "lendscore_aggregate=trace").
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: PathBuf::from("."),
            behavior_file: DEFAULT_BEHAVIOR_FILE.to_string(),
            scores_file: DEFAULT_SCORES_FILE.to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from an optional TOML file and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        file: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let env = env
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("inputs");

        let cfg: PipelineConfig = builder
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that would make the two output tables collide
    /// or leave one of them without a name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.behavior_file.trim().is_empty() || self.scores_file.trim().is_empty() {
            return Err(ConfigError::Invalid("output file names must not be empty".to_string()));
        }
        if self.behavior_file == self.scores_file {
            return Err(ConfigError::Invalid(format!(
                "behaviour and score tables share the file name {}",
                self.behavior_file
            )));
        }
        Ok(())
    }

    /// Path of the wallet behaviour table.
    pub fn behavior_path(&self) -> PathBuf {
        self.output_dir.join(&self.behavior_file)
    }

    /// Path of the wallet score table.
    pub fn scores_path(&self) -> PathBuf {
        self.output_dir.join(&self.scores_file)
    }
}
