//! Infrastructure - cold path only
//!
//! Non-streaming concerns:
//! - Configuration loading and processor wiring
//! - Logging setup
//! - Per-file counters

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::Config;
pub use metrics::{ProcessMetrics, ProcessSummary};
