//! lendscore — behavioural credit scores for lending-protocol wallets.
//!
//! Reads JSON event chunks (deposits, withdraws, borrows, repays,
//! liquidates), builds per-wallet behaviour statistics, scores every wallet
//! and writes the behaviour and score tables as CSV.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;

use lendscore_core::constants::ENV_PREFIX;
use lendscore_pipeline::report::read_scores_csv;
use lendscore_pipeline::{JsonChunkLoader, LogFormat, Pipeline, PipelineConfig, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "lendscore")]
#[command(version, about = "Heuristic credit scores from lending-protocol activity")]
struct Cli {
    /// TOML configuration file. `LENDSCORE_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every wallet and write the behaviour and score tables.
    Run(RunArgs),
    /// Print one wallet's statistics and score as JSON.
    Inspect(InspectArgs),
    /// Summarize a previously written score table.
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON chunk files or directories of them. Replaces configured inputs.
    inputs: Vec<PathBuf>,

    /// Directory for the output tables.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the run summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Wallet address to look up.
    wallet: String,

    /// JSON chunk files or directories of them. Replaces configured inputs.
    #[arg(short, long)]
    inputs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    /// Score table to read (default: the configured score table).
    path: Option<PathBuf>,

    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Layer CLI flags over file and environment configuration.
    fn load_config(&self) -> Result<PipelineConfig> {
        let mut config = PipelineConfig::load(self.config.as_deref()).with_context(|| {
            format!("failed to load configuration (file and {ENV_PREFIX}_* variables)")
        })?;

        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.parse::<LogFormat>()?;
        }

        match &self.command {
            Commands::Run(args) => {
                if !args.inputs.is_empty() {
                    config.inputs = args.inputs.clone();
                }
                if let Some(dir) = &args.output_dir {
                    config.output_dir = dir.clone();
                }
            }
            Commands::Inspect(args) => {
                if !args.inputs.is_empty() {
                    config.inputs = args.inputs.clone();
                }
            }
            Commands::Summary(_) => {}
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    init_logging(&config.log_level, config.log_format);
    info!("lendscore v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run(args) => run(config, args),
        Commands::Inspect(args) => inspect(config, args),
        Commands::Summary(args) => summary(config, args),
    }
}

fn run(config: PipelineConfig, args: RunArgs) -> Result<()> {
    if config.inputs.is_empty() {
        bail!("No inputs given (pass chunk files or set `inputs` in the configuration)");
    }
    let pipeline = Pipeline::new(config);
    let output = pipeline.run().context("Scoring run failed")?;

    println!("Wrote {}", pipeline.config().behavior_path().display());
    println!("Wrote {}", pipeline.config().scores_path().display());
    print_summary(&output.summary, args.json)
}

fn inspect(config: PipelineConfig, args: InspectArgs) -> Result<()> {
    let wallet = args.wallet.as_str();
    let loader = JsonChunkLoader::new(config.inputs.iter().cloned());
    let pipeline = Pipeline::new(config);
    let output = pipeline
        .evaluate(&loader)
        .context("Failed to load inputs")?;

    let (Some(stats), Some(score)) = (output.stats.get(wallet), output.scores.get(wallet)) else {
        bail!("Wallet {wallet} has no activity in the inputs");
    };

    let view = json!({
        "wallet": wallet,
        "stats": stats,
        "score": score.score,
        "reason_for_score": score.reason_text(),
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn summary(config: PipelineConfig, args: SummaryArgs) -> Result<()> {
    let path = args.path.unwrap_or_else(|| config.scores_path());
    let rows = read_scores_csv(&path)
        .with_context(|| format!("Failed to read score table {}", path.display()))?;
    print_summary(&RunSummary::from_rows(&rows), args.json)
}

fn print_summary(summary: &RunSummary, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

/// Initialize tracing subscriber with the given filter and output format.
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    // Logs go to stderr so stdout stays clean for tables and JSON.
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
