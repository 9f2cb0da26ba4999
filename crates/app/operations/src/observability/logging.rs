//! `tracing` subscriber setup.
//!
//! The pipeline crates only emit `tracing` events; a node installs one
//! global subscriber at startup. `RUST_LOG` overrides the configured level.

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Log format for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for machine parsing (production).
    #[default]
    Json,
    /// Human-readable format (development).
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = std::convert::Infallible;

    /// Parse from string, case-insensitive. Defaults to Json for unknown values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "pretty" | "text" | "human" => Self::Pretty,
            _ => Self::Json,
        })
    }
}

/// Parse log level from string, falling back to `INFO`.
pub fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        _ => "error",
    }
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)))
}

/// Install the global `fmt` subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing(level: Level, format: LogFormat) -> Result<(), InitError> {
    let filter = env_filter(level);
    match format {
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    }
}

/// [`init_tracing`] with level and format taken from configuration.
pub fn init_tracing_from_config(config: &ObservabilityConfig) -> Result<(), InitError> {
    let format: LogFormat = config.log_format.parse().unwrap_or_default();
    init_tracing(parse_level(&config.log_level), format)
}
