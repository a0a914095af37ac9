//! Command-line front end for single-file ingestion
//!
//! Usage: `tick-ingest <file> [compression]`
//!
//! Processes the file into counting sinks and prints the summary as JSON.
//! The compression argument overrides `pipeline.compression` from the
//! config file.

use anyhow::Context;
use clap::Parser;
use tick_ingest::infrastructure::logging::init_logging;
use tick_ingest::pipeline::CountingAggregators;
use tick_ingest::{Compression, Config, ProcessSummary};
use std::path::{Path, PathBuf};

/// Main application state
pub struct IngestApp {
    config: Config,
}

impl IngestApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Process one file end to end
    pub fn run(&self, path: &Path, compression: Option<Compression>) -> anyhow::Result<ProcessSummary> {
        let compression = compression.unwrap_or(self.config.pipeline.compression);
        let mut processor = self
            .config
            .build_processor(CountingAggregators::default())
            .context("Invalid pipeline configuration")?;

        let summary = processor
            .process_with(path, compression)
            .with_context(|| format!("Failed to process {}", path.display()))?;

        let sinks = processor.aggregators();
        tracing::info!(
            quotes = sinks.quote.count(),
            trades = sinks.trade.count(),
            open_interest = sinks.open_interest.count(),
            other = sinks.other.count(),
            lines_per_second = summary.lines_per_second(),
            "Ingestion complete"
        );
        Ok(summary)
    }
}

#[derive(Parser)]
#[command(name = "tick-ingest", about = "Stream a market data text file through the ingestion pipeline")]
struct Cli {
    /// Input file, plain or compressed
    file: PathBuf,

    /// none, gzip, bzip2, zlib, zip or infer; defaults to `pipeline.compression`
    compression: Option<Compression>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    let _guards = init_logging(&config.logging)?;

    let summary = IngestApp::new(config).run(&cli.file, cli.compression)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
