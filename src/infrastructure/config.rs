//! Configuration management for file ingestion
//!
//! Loads configuration from config.toml at startup. Every value has a
//! default so a missing file or section is never an error.

use crate::core::{FieldSplitter, FixedPoint8, OpenInterestRecord, OtherRecord, QuoteRecord, TradeRecord};
use crate::parsing::DelimitedRecordParser;
use crate::pipeline::bad_line::PrintBadLineHandler;
use crate::pipeline::line_filter::{Inverted, LineFilter, RegexLineFilter, SubstringLineFilter};
use crate::pipeline::missing_data::{CarryForward, ConstantFill, MissingDataHandler, PriceQtyMissingDataHandler};
use crate::pipeline::processor::TextFileProcessor;
use crate::pipeline::record_filter::{FieldInList, RecordFilter};
use crate::pipeline::routing::{Aggregator, Aggregators};
use crate::source::Compression;
use crate::{Result, TickIngestError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ingestion configuration
///
/// Optional sections switch their pipeline stage off when absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub line_filter: Option<LineFilterConfig>,

    #[serde(default)]
    pub record_filter: Option<RecordFilterConfig>,

    #[serde(default)]
    pub bad_lines: BadLinesConfig,

    #[serde(default)]
    pub missing_data: Option<MissingDataConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source and parser settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Leading lines discarded unconditionally
    #[serde(default)]
    pub skip_rows: u64,

    /// Used when the caller does not name a scheme
    #[serde(default)]
    pub compression: Compression,

    #[serde(default)]
    pub delimiter: FieldSplitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFilterKind {
    Regex,
    Substring,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineFilterConfig {
    pub kind: LineFilterKind,

    /// Regex filters only
    #[serde(default)]
    pub pattern: Option<String>,

    /// Substring filters only
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Keep lines that do NOT match
    #[serde(default)]
    pub invert: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordFilterConfig {
    pub field_index: usize,
    pub allowed_values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BadLinesConfig {
    /// Abort the file on the first malformed line
    #[serde(default)]
    pub raise: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationKind {
    #[default]
    Constant,
    CarryForward,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MissingDataConfig {
    #[serde(default)]
    pub policy: ImputationKind,

    /// Constant fill, or carry-forward fallback
    #[serde(default)]
    pub price: FixedPoint8,

    #[serde(default)]
    pub qty: FixedPoint8,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Rolling log files are written here when set
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            compression: Compression::Infer,
            delimiter: FieldSplitter::COMMA,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from `CONFIG_PATH` (default `config.toml`)
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(config_path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Config::default())
            }
            Err(e) => Err(TickIngestError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))),
        }
    }

    /// Parse TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| TickIngestError::Config(format!("Failed to parse config: {e}")))
    }

    /// Build a processor wired as configured around the given sinks.
    ///
    /// Invalid values (bad regex, a filter kind without its patterns) fail
    /// here, before any file is touched.
    pub fn build_processor<Q, T, I, O>(
        &self,
        aggregators: Aggregators<Q, T, I, O>,
    ) -> Result<TextFileProcessor<Q, T, I, O>>
    where
        Q: Aggregator<QuoteRecord>,
        T: Aggregator<TradeRecord>,
        I: Aggregator<OpenInterestRecord>,
        O: Aggregator<OtherRecord>,
    {
        let parser = DelimitedRecordParser::new(self.pipeline.delimiter);
        Ok(TextFileProcessor::builder(parser, aggregators)
            .skip_rows(self.pipeline.skip_rows)
            .boxed_line_filter(self.line_filter.as_ref().map(LineFilterConfig::build).transpose()?)
            .boxed_record_filter(self.record_filter.as_ref().map(RecordFilterConfig::build))
            .boxed_missing_data_handler(self.missing_data.as_ref().map(MissingDataConfig::build))
            .bad_line_handler(PrintBadLineHandler::new(self.bad_lines.raise))
            .build())
    }
}

impl LineFilterConfig {
    pub fn build(&self) -> Result<Box<dyn LineFilter + Send>> {
        let filter: Box<dyn LineFilter + Send> = match self.kind {
            LineFilterKind::Regex => {
                let pattern = self.pattern.as_deref().ok_or_else(|| {
                    TickIngestError::Config("regex line filter needs `pattern`".to_string())
                })?;
                let filter = RegexLineFilter::new(pattern)?;
                if self.invert {
                    Box::new(Inverted(filter))
                } else {
                    Box::new(filter)
                }
            }
            LineFilterKind::Substring => {
                if self.patterns.is_empty() {
                    tracing::warn!("substring line filter has no patterns");
                }
                let filter = SubstringLineFilter::new(self.patterns.iter().cloned());
                if self.invert {
                    Box::new(Inverted(filter))
                } else {
                    Box::new(filter)
                }
            }
        };
        Ok(filter)
    }
}

impl RecordFilterConfig {
    pub fn build(&self) -> Box<dyn RecordFilter + Send> {
        Box::new(FieldInList::new(self.field_index, self.allowed_values.iter().cloned()))
    }
}

impl MissingDataConfig {
    pub fn build(&self) -> Box<dyn MissingDataHandler + Send> {
        let fill = ConstantFill::new(self.price, self.qty);
        match self.policy {
            ImputationKind::Constant => Box::new(PriceQtyMissingDataHandler::new(fill)),
            ImputationKind::CarryForward => {
                Box::new(PriceQtyMissingDataHandler::new(CarryForward::new(fill)))
            }
        }
    }
}
