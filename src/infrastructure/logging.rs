//! Console and rolling file logging
//!
//! Console output always. When `logging.dir` is set, two daily-rolling
//! files are added under it:
//! - <dir>/main/main.* - everything, JSON
//! - <dir>/bad_lines/bad_lines.* - malformed line diagnostics only

use super::config::LoggingConfig;
use crate::pipeline::bad_line::BAD_LINE_TARGET;
use crate::{Result, TickIngestError};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `config.level`. Returns the WorkerGuards which must
/// be kept alive for the duration of the program.
pub fn init_logging(config: &LoggingConfig) -> Result<Vec<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| TickIngestError::Config(format!("invalid log level {:?}: {e}", config.level)))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    let mut guards = Vec::new();
    let file_layers = match &config.dir {
        Some(dir) => {
            let (main_appender, main_guard) = create_appender(dir, "main")?;
            guards.push(main_guard);
            let (bad_line_appender, bad_line_guard) = create_appender(dir, "bad_lines")?;
            guards.push(bad_line_guard);

            let main_layer = tracing_subscriber::fmt::layer()
                .with_writer(main_appender)
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .json();

            let bad_line_layer = tracing_subscriber::fmt::layer()
                .with_writer(bad_line_appender)
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
                    metadata.target() == BAD_LINE_TARGET
                }));

            Some(main_layer.and_then(bad_line_layer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layers)
        .with(console_layer)
        .try_init()
        .map_err(|e| TickIngestError::Config(format!("logging already initialized: {e}")))?;

    match &config.dir {
        Some(dir) => tracing::info!(dir = %dir.display(), "Logging system initialized"),
        None => tracing::debug!("Logging system initialized (console only)"),
    }

    Ok(guards)
}

/// Daily-rolling non-blocking appender in `<dir>/<name>/`
fn create_appender(dir: &Path, name: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = dir.join(name);
    fs::create_dir_all(&dir).map_err(|source| TickIngestError::Open {
        path: dir.clone(),
        source,
    })?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &dir, name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (_writer, _guard) = create_appender(dir.path(), "bad_lines").unwrap();
        assert!(dir.path().join("bad_lines").is_dir());
    }

    #[test]
    fn test_appender_fails_on_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main"), b"not a directory").unwrap();
        let err = create_appender(dir.path(), "main").unwrap_err();
        assert!(matches!(err, TickIngestError::Open { .. }));
    }
}
