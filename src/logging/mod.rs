//! Log output setup
//!
//! The `--debug` and `--quiet` flags collapse into a [`Verbosity`] which
//! selects the tracing-subscriber filter. This crate logs at the selected
//! level; dependencies are held at `warn`.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Tracing error types
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("Initialization error: {0}")]
    InitError(String),
}

/// How much the run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// No logs and no error line
    Quiet,
    /// Progress at info level, one-line errors
    #[default]
    Normal,
    /// Requests and raw responses (redacted), errors with their cause
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(debug: bool, quiet: bool) -> Self {
        match (debug, quiet) {
            (_, true) => Verbosity::Quiet,
            (true, false) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    pub fn log_level(&self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => None,
            Verbosity::Normal => Some("info"),
            Verbosity::Debug => Some("debug"),
        }
    }

    pub fn shows_errors(&self) -> bool {
        *self != Verbosity::Quiet
    }

    pub fn shows_error_detail(&self) -> bool {
        *self == Verbosity::Debug
    }
}

/// Export format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// Plain text format
    #[default]
    Text,
    /// JSON format (structured logging)
    Json,
}

/// Tracing configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    pub verbosity: Verbosity,
    pub export_format: ExportFormat,
}

impl TracingConfig {
    pub fn enabled(&self) -> bool {
        self.verbosity.log_level().is_some()
    }

    /// Filter directive for the configured verbosity, `None` when quiet.
    pub fn filter_directive(&self) -> Option<String> {
        self.verbosity
            .log_level()
            .map(|level| format!("warn,nest_snapshot={}", level))
    }
}

/// Initialize tracing with the given configuration
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let Some(directive) = config.filter_directive() else {
        return Ok(());
    };

    let env_filter =
        EnvFilter::try_new(&directive).map_err(|e| TracingError::InitError(e.to_string()))?;

    let result = match config.export_format {
        ExportFormat::Json => Registry::default()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        ExportFormat::Text => Registry::default()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init(),
    };
    result.map_err(|e| TracingError::InitError(e.to_string()))
}
