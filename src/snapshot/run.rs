//! Run driver
//!
//! `Start → Authenticating → Resolving → Fetching → Persisting → Done`.
//! The first failing stage ends the run; nothing is written before the final
//! persist succeeds.

use super::cameras::{select_camera, CameraDescriptor};
use super::client::NestClient;
use super::{persist, ErrorKind, SnapshotError};
use crate::config::RunConfig;
use crate::security::logging::SanitizeExt;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Pipeline stage, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticating,
    Resolving,
    Fetching,
    Persisting,
}

impl Stage {
    /// One-line message shown when this stage fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Stage::Authenticating => "error creating login session",
            Stage::Resolving => "error getting camera(s)",
            Stage::Fetching => "error getting image",
            Stage::Persisting => "error saving image",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Authenticating => "authenticating",
            Stage::Resolving => "resolving",
            Stage::Fetching => "fetching",
            Stage::Persisting => "persisting",
        };
        f.write_str(s)
    }
}

/// A failed run: the stage it stopped at and why.
#[derive(Debug, Error)]
#[error("{}: {}", .stage.failure_message(), .source.kind())]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: SnapshotError,
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Underlying cause with secrets redacted, for debug output.
    pub fn detail(&self) -> String {
        self.source.to_string().sanitize_for_errors()
    }
}

trait StageExt<T> {
    fn at(self, stage: Stage) -> Result<T, RunError>;
}

impl<T> StageExt<T> for Result<T, SnapshotError> {
    fn at(self, stage: Stage) -> Result<T, RunError> {
        self.map_err(|source| RunError { stage, source })
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub camera: CameraDescriptor,
    /// Dimensions of the frame the server returned
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

/// Authenticate, resolve the camera, fetch one frame and write it out.
pub async fn run(client: &NestClient, config: &RunConfig) -> Result<RunSummary, RunError> {
    debug!(stage = %Stage::Authenticating, "entering stage");
    let session = client
        .authenticate(&config.access_token, config.password.as_deref())
        .await
        .at(Stage::Authenticating)?;

    debug!(stage = %Stage::Resolving, "entering stage");
    let cameras = client
        .resolve_cameras(&session, &config.access_token)
        .await
        .at(Stage::Resolving)?;
    let camera = select_camera(cameras).at(Stage::Resolving)?;

    debug!(stage = %Stage::Fetching, "entering stage");
    let image = client
        .fetch_image(&session, &camera.service_host, &camera.uuid, config.image.width)
        .await
        .at(Stage::Fetching)?;
    let (width, height) = (image.width(), image.height());

    debug!(stage = %Stage::Persisting, "entering stage");
    persist::save(image, &config.output).at(Stage::Persisting)?;

    info!("done");
    Ok(RunSummary {
        camera,
        width,
        height,
        output: config.output.path.clone(),
    })
}
