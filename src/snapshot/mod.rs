//! Nest share snapshot pipeline
//!
//! Drives the three calls behind a publicly shared Nest camera link and
//! writes the resulting frame to disk:
//!
//! - **auth**: exchange the share token (+ optional password) for a session
//! - **cameras**: list the cameras behind the token and pick the first
//! - **fetch**: download one JPEG frame from the camera's service host
//! - **persist**: re-encode the frame as PNG or JPEG and write it out
//!
//! [`run::run`] chains the stages and stops at the first failure.
//!
//! # Example
//!
//! ```ignore
//! use nest_snapshot::config::{ClientConfig, ImageSpec, OutputTarget, RunConfig};
//! use nest_snapshot::snapshot::{run, NestClient};
//!
//! let client = NestClient::new(ClientConfig::default())?;
//! let config = RunConfig::new(
//!     "abc123",
//!     None,
//!     ImageSpec::default(),
//!     OutputTarget::from_path("out.png")?,
//! )?;
//! let summary = run(&client, &config).await?;
//! println!("saved {}x{} frame", summary.width, summary.height);
//! ```

pub mod auth;
pub mod cameras;
pub mod client;
pub mod fetch;
pub mod persist;
pub mod run;

pub use auth::SessionCredential;
pub use cameras::{select_camera, CameraDescriptor};
pub use client::NestClient;
pub use fetch::DecodedImage;
pub use persist::{save, save_to_path};
pub use run::{run, RunError, RunSummary, Stage};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by any stage of a snapshot run
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("non-200 status returned by server: {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("malformed JSON response ({source}): {body}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("status_description {description:?} is not \"ok\" ({detail}): {body}")]
    StatusNotOk {
        description: String,
        detail: String,
        body: String,
    },

    #[error("expected {expected} item(s) in response, got {actual}: {body}")]
    UnexpectedItemCount {
        expected: &'static str,
        actual: usize,
        body: String,
    },

    #[error("missing or empty field {field}: {body}")]
    MissingField { field: &'static str, body: String },

    #[error("unexpected payload format: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to create {}: {}", .path.display(), .source)]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {}", .path.display(), .source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("unsupported output format for file {0}, must end in .png or .jpeg")]
    UnsupportedFormat(String),
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Error class reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad flags, caught before any network call
    InvalidInput,
    /// Non-200 status, connection failure or timeout
    Transport,
    /// Malformed JSON or missing/unexpected fields
    Protocol,
    /// Snapshot payload is not a JPEG
    Decode,
    /// Output file could not be created, encoded or written
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Transport => "transport error",
            ErrorKind::Protocol => "protocol error",
            ErrorKind::Decode => "decode error",
            ErrorKind::Persistence => "persistence error",
        };
        f.write_str(s)
    }
}

impl SnapshotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnapshotError::InvalidInput(_) => ErrorKind::InvalidInput,
            SnapshotError::UnexpectedStatus(_) | SnapshotError::Http(_) => ErrorKind::Transport,
            SnapshotError::InvalidUrl { .. }
            | SnapshotError::MalformedJson { .. }
            | SnapshotError::StatusNotOk { .. }
            | SnapshotError::UnexpectedItemCount { .. }
            | SnapshotError::MissingField { .. } => ErrorKind::Protocol,
            SnapshotError::Decode(_) => ErrorKind::Decode,
            SnapshotError::Create { .. }
            | SnapshotError::Write { .. }
            | SnapshotError::Encode(_)
            | SnapshotError::UnsupportedFormat(_) => ErrorKind::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            SnapshotError::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            SnapshotError::UnexpectedStatus(reqwest::StatusCode::FORBIDDEN).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            SnapshotError::StatusNotOk {
                description: "error".into(),
                detail: String::new(),
                body: "{}".into()
            }
            .kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            SnapshotError::UnexpectedItemCount {
                expected: "exactly one",
                actual: 0,
                body: "{}".into()
            }
            .kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            SnapshotError::UnsupportedFormat("out.gif".into()).kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn test_malformed_json_is_protocol() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = SnapshotError::MalformedJson {
            source,
            body: "{not json".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.to_string().contains("{not json"));
    }

    #[test]
    fn test_status_error_message() {
        let err = SnapshotError::UnexpectedStatus(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(
            err.to_string(),
            "non-200 status returned by server: 404 Not Found"
        );
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Protocol.to_string(), "protocol error");
        assert_eq!(ErrorKind::Transport.to_string(), "transport error");
        assert_eq!(ErrorKind::InvalidInput.to_string(), "invalid input");
    }
}
