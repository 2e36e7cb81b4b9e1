use crate::primitives::*;
use std::sync::OnceLock;
use tracing::Subscriber;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Global logger instance - ensures single initialization
static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Crates whose events follow the requested level; everything else is held at warn
const LOCAL_TARGETS: [&str; 2] = ["testbed_lib", "testbed"];

/// Logger implementation using tracing with indicatif progress integration
#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(config: LoggerConfig) -> Result<&'static Self, LoggerError> {
        if GLOBAL_LOGGER.get().is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }

        let indicatif_layer = IndicatifLayer::new();

        // RUST_LOG wins over the configured verbosity
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directives(config.level)));

        let fmt_layer = match config.output {
            LogOutput::Stderr => format_layer(indicatif_layer.get_stderr_writer(), &config),
            LogOutput::Stdout => format_layer(indicatif_layer.get_stdout_writer(), &config),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(indicatif_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed {
                reason: e.to_string(),
            })?;

        let logger = Logger {
            config: config.clone(),
        };
        GLOBAL_LOGGER
            .set(logger)
            .map_err(|_| LoggerError::AlreadyInitialized)?;

        tracing::debug!(
            level = ?config.level,
            format = ?config.format,
            output = ?config.output,
            ansi = config.ansi,
            "logger initialized"
        );

        GLOBAL_LOGGER.get().ok_or(LoggerError::AlreadyInitialized)
    }

    /// Get reference to the global logger instance
    pub fn global() -> Option<&'static Self> {
        GLOBAL_LOGGER.get()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Log a warning message with optional context
    pub fn warn(&self, message: &str, context: Option<LogContext>) {
        if let Some(ctx) = context {
            tracing::warn!(operation = %ctx.operation, "{}", message);
        } else {
            tracing::warn!("{}", message);
        }
    }

    /// Log an info message with optional context
    pub fn info(&self, message: &str, context: Option<LogContext>) {
        if let Some(ctx) = context {
            tracing::info!(operation = %ctx.operation, "{}", message);
        } else {
            tracing::info!("{}", message);
        }
    }
}

/// Formatting layer for the configured format over `writer`
fn format_layer<S, W>(writer: W, config: &LoggerConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match config.format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_ansi(config.ansi)
            .compact()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .json()
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_ansi(config.ansi)
            .pretty()
            .boxed(),
    }
}

/// Filter string: local crates at `level`, dependencies at warn
pub fn filter_directives(level: LogLevel) -> String {
    let level = level.as_directive();
    let mut directives: Vec<String> = LOCAL_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Quick logging macros that use the global logger if available, fall back to tracing macros
#[macro_export]
macro_rules! log_warn {
    ($msg:expr) => {
        if let Some(logger) = $crate::logger::Logger::global() {
            logger.warn($msg, None);
        } else {
            tracing::warn!("{}", $msg);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($msg:expr) => {
        if let Some(logger) = $crate::logger::Logger::global() {
            logger.info($msg, None);
        } else {
            tracing::info!("{}", $msg);
        }
    };
    ($msg:expr, $ctx:expr) => {
        if let Some(logger) = $crate::logger::Logger::global() {
            logger.info($msg, Some($ctx));
        } else {
            tracing::info!("{}", $msg);
        }
    };
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
