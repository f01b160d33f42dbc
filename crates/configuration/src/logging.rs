use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

pub const LOG_FILE_NAME: &str = "library-seed.log";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `settings.level` and must parse if it is set.
/// Console output goes to stderr so that stdout stays clean for `schema` and
/// `verify --json`. When a log directory is configured the returned guard
/// flushes the file writer on drop and must be kept alive until exit.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = build_filter(settings)?;

    let console = if settings.json {
        fmt::layer().with_writer(std::io::stderr).json().boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| ConfigError::TracingError(e.to_string()))?;

    Ok(guard)
}

fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, ConfigError> {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok(), settings)
}

/// A set but unparsable `RUST_LOG` is an error rather than a silent fallback
/// to `settings.level`.
fn filter_from(
    rust_log: Option<String>,
    settings: &LoggingSettings,
) -> Result<EnvFilter, ConfigError> {
    match rust_log.filter(|directives| !directives.trim().is_empty()) {
        Some(directives) => EnvFilter::try_new(&directives).map_err(|e| {
            let var = EnvFilter::DEFAULT_ENV;
            ConfigError::TracingError(format!("invalid {var} '{directives}': {e}"))
        }),
        None => EnvFilter::try_new(&settings.level).map_err(|e| {
            ConfigError::TracingError(format!("bad log level '{}': {e}", settings.level))
        }),
    }
}
