//! Command-line flags and top-level error reporting.
//!
//! Flags are validated into a [`RunConfig`] before any network call; a bad
//! flag is an `InvalidInput` error. [`report_error`] is the single place that
//! prints a terminal failure.

use crate::config::{ImageSpec, OutputTarget, RunConfig, DEFAULT_IMAGE_WIDTH};
use crate::logging::{ExportFormat, TracingConfig, Verbosity};
use crate::security::logging::SanitizeExt;
use crate::snapshot::{Result, SnapshotError};
use clap::Parser;
use std::path::PathBuf;

/// Grab a still frame from a publicly shared Nest camera.
#[derive(Parser, Debug)]
#[command(
    name = "nest-snapshot",
    version = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("NEST_SNAPSHOT_GIT_HASH"),
        ", built ",
        env!("NEST_SNAPSHOT_BUILD_DATE"),
        ")"
    ),
    about = "Grab a still frame from a publicly shared Nest camera"
)]
pub struct Cli {
    /// The camera's share token (the last path segment of the share link).
    #[arg(long, env = "NEST_SNAPSHOT_TOKEN", hide_env_values = true)]
    pub token: String,

    /// The camera's password, if the link is password-protected.
    #[arg(long, env = "NEST_SNAPSHOT_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    /// The output file, must end in .png or .jpeg.
    #[arg(long)]
    pub out: PathBuf,

    /// The requested image width in pixels.
    #[arg(long, default_value_t = DEFAULT_IMAGE_WIDTH)]
    pub width: u32,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,

    /// Disable all logging.
    #[arg(long)]
    pub quiet: bool,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Text)]
    pub log_format: ExportFormat,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.debug, self.quiet)
    }

    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            verbosity: self.verbosity(),
            export_format: self.log_format,
        }
    }

    /// Validate the flags into a run configuration.
    pub fn run_config(&self) -> Result<RunConfig> {
        let output = OutputTarget::from_path(&self.out).map_err(|e| match e {
            SnapshotError::UnsupportedFormat(_) => {
                SnapshotError::InvalidInput("--out must end in .png or .jpeg".to_string())
            }
            other => other,
        })?;
        let image = ImageSpec::new(self.width)?;
        let password = Some(self.password.clone()).filter(|p| !p.is_empty());
        RunConfig::new(self.token.clone(), password, image, output)
    }
}

/// Format the `[ERROR]` line for a terminal failure.
///
/// `detail` is appended only in debug mode and is redacted first.
pub fn format_error(verbosity: Verbosity, message: &str, detail: Option<&str>) -> Option<String> {
    if !verbosity.shows_errors() {
        return None;
    }
    match detail {
        Some(detail) if verbosity.shows_error_detail() && !detail.is_empty() => Some(format!(
            "[ERROR]: {} - {}",
            message,
            detail.sanitize_for_errors()
        )),
        _ => Some(format!("[ERROR]: {}", message)),
    }
}

/// Print a terminal failure to stderr, honouring `--quiet` and `--debug`.
pub fn report_error(verbosity: Verbosity, message: &str, detail: Option<&str>) {
    if let Some(line) = format_error(verbosity, message, detail) {
        eprintln!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
