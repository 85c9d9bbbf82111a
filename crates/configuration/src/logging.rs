use crate::error::ConfigError;
use crate::settings::{LogFormat, LoggingSettings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber described by `settings`.
///
/// `RUST_LOG` takes precedence over the configured level. When a log directory is
/// configured, output goes to a daily rolling file through a non-blocking writer
/// and the returned guard must be kept alive until shutdown so buffered lines
/// are flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let Some(directory) = &settings.directory else {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        let installed = match settings.format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Compact => builder.compact().try_init(),
        };
        installed.map_err(|e| ConfigError::Logging(e.to_string()))?;
        return Ok(None);
    };

    let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer);
    let installed = match settings.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing::info!(directory = %directory.display(), "File logging enabled.");
    Ok(Some(guard))
}
