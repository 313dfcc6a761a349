//! Camera lookup for a share token

use super::auth::SessionCredential;
use super::client::{check_status, read_envelope, with_session, NestClient};
use super::{Result, SnapshotError};
use crate::security::logging::SanitizeExt;
use serde::Deserialize;
use tracing::{debug, info};

/// Listing endpoint on the share API host.
pub const CAMERAS_ENDPOINT: &str = "/api/dropcam/cameras.get_by_public_token";

/// One camera behind a share token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CameraDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    /// Per-camera API host serving snapshots
    #[serde(rename = "nexus_api_nest_domain_host", default)]
    pub service_host: String,
}

impl NestClient {
    /// List the cameras behind a share token, in server order.
    ///
    /// The returned list is never empty.
    pub async fn resolve_cameras(
        &self,
        session: &SessionCredential,
        access_token: &str,
    ) -> Result<Vec<CameraDescriptor>> {
        info!("getting camera(s)");

        let mut url = self.api_url(CAMERAS_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("token", access_token)
            .append_pair("_", &chrono::Utc::now().timestamp().to_string());
        debug!(url = %url.as_str().sanitize_for_logs(), "making GET request");

        let response = with_session(self.http().get(url), session)?.send().await?;
        let response = check_status(response)?;

        let (cameras, body) = read_envelope::<CameraDescriptor>(response, "camera listing")
            .await?
            .into_ok_items()?;
        if cameras.is_empty() {
            return Err(SnapshotError::UnexpectedItemCount {
                expected: "at least one",
                actual: 0,
                body,
            });
        }

        info!(count = cameras.len(), "successfully listed camera(s)");
        Ok(cameras)
    }
}

/// Pick the camera to snapshot: always the first one the server returned.
///
/// The selected camera must carry a UUID and a service host.
pub fn select_camera(cameras: Vec<CameraDescriptor>) -> Result<CameraDescriptor> {
    let camera = cameras
        .into_iter()
        .next()
        .ok_or_else(|| SnapshotError::UnexpectedItemCount {
            expected: "at least one",
            actual: 0,
            body: String::new(),
        })?;

    if camera.uuid.is_empty() {
        return Err(SnapshotError::MissingField {
            field: "uuid",
            body: format!("{:?}", camera),
        });
    }
    if camera.service_host.is_empty() {
        return Err(SnapshotError::MissingField {
            field: "nexus_api_nest_domain_host",
            body: format!("{:?}", camera),
        });
    }

    info!("using camera name={}, uuid={}", camera.name, camera.uuid);
    Ok(camera)
}
