//! Shared HTTP plumbing for the Nest share API
//!
//! One `reqwest::Client` per run, built with the configured timeout, plus the
//! response envelope every JSON endpoint returns.

use super::auth::SessionCredential;
use super::{Result, SnapshotError};
use crate::config::ClientConfig;
use crate::security::logging::SanitizeExt;
use reqwest::header::{HeaderValue, COOKIE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Cookie carrying the session credential on every call after login.
pub const SESSION_COOKIE_NAME: &str = "website_2";

/// Client for the unofficial Nest share API
#[derive(Debug, Clone)]
pub struct NestClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl NestClient {
    /// Build a client; the timeout applies to every request it sends.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for an endpoint on the share API host.
    pub(crate) fn api_url(&self, endpoint: &str) -> Result<Url> {
        parse_url(&format!("{}{}", self.config.api_base, endpoint))
    }

    /// Absolute URL for an endpoint on a per-camera service host.
    pub(crate) fn service_url(&self, host: &str, endpoint: &str) -> Result<Url> {
        parse_url(&format!("{}://{}{}", self.config.image_scheme, host, endpoint))
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| SnapshotError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// `Cookie` header value for the session credential.
pub(crate) fn session_cookie(session: &SessionCredential) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE_NAME, session.as_str())).map_err(|_| {
        SnapshotError::MissingField {
            field: "session_token",
            body: "session credential is not a valid cookie value".to_string(),
        }
    })
}

/// Attach the session cookie to a request.
pub(crate) fn with_session(
    request: reqwest::RequestBuilder,
    session: &SessionCredential,
) -> Result<reqwest::RequestBuilder> {
    Ok(request.header(COOKIE, session_cookie(session)?))
}

/// Reject anything but `200 OK`.
pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SnapshotError::UnexpectedStatus(status));
    }
    Ok(response)
}

/// Envelope shared by the login and camera listing responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    #[serde(default)]
    pub status: Option<i64>,
    pub items: Option<Vec<T>>,
    #[serde(default)]
    pub status_description: String,
    #[serde(default)]
    pub status_detail: String,
    /// Raw body, kept for error reporting
    #[serde(skip)]
    pub raw: String,
}

impl<T> ApiResponse<T> {
    /// Items of a response whose `status_description` is `"ok"`.
    pub fn into_ok_items(self) -> Result<(Vec<T>, String)> {
        if self.status_description != "ok" {
            return Err(SnapshotError::StatusNotOk {
                description: self.status_description,
                detail: self.status_detail,
                body: self.raw,
            });
        }
        Ok((self.items.unwrap_or_default(), self.raw))
    }
}

/// Read a 200 response body and parse the JSON envelope.
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<ApiResponse<T>> {
    let bytes = response.bytes().await?;
    parse_envelope(&bytes, what)
}

pub(crate) fn parse_envelope<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<ApiResponse<T>> {
    let raw = String::from_utf8_lossy(bytes).into_owned();
    debug!(
        response = %raw.sanitize_for_logs(),
        "got JSON {} response from server", what
    );

    let mut envelope: ApiResponse<T> =
        serde_json::from_slice(bytes).map_err(|source| SnapshotError::MalformedJson {
            source,
            body: raw.clone(),
        })?;
    debug!(status = ?envelope.status, description = %envelope.status_description, "parsed {} envelope", what);
    envelope.raw = raw;
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ErrorKind;

    #[derive(Debug, Deserialize)]
    struct Item {
        value: String,
    }

    #[test]
    fn test_parse_envelope_ok() {
        let body = br#"{"status":0,"items":[{"value":"a"},{"value":"b"}],"status_description":"ok","status_detail":""}"#;
        let envelope: ApiResponse<Item> = parse_envelope(body, "test").unwrap();
        assert_eq!(envelope.status, Some(0));
        let (items, raw) = envelope.into_ok_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].value, "a");
        assert!(raw.contains("status_description"));
    }

    #[test]
    fn test_parse_envelope_missing_items_is_empty() {
        let body = br#"{"status_description":"ok"}"#;
        let envelope: ApiResponse<Item> = parse_envelope(body, "test").unwrap();
        let (items, _) = envelope.into_ok_items().unwrap();
        assert!(items.is_empty());

        let body = br#"{"status_description":"ok","items":null}"#;
        let envelope: ApiResponse<Item> = parse_envelope(body, "test").unwrap();
        assert!(envelope.into_ok_items().unwrap().0.is_empty());
    }

    #[test]
    fn test_status_not_ok() {
        let body = br#"{"status":403,"items":[],"status_description":"forbidden","status_detail":"bad password"}"#;
        let envelope: ApiResponse<Item> = parse_envelope(body, "test").unwrap();
        let err = envelope.into_ok_items().unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::StatusNotOk { ref description, ref detail, .. }
                if description == "forbidden" && detail == "bad password"
        ));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_envelope::<Item>(b"<html>nope</html>", "test").unwrap_err();
        assert!(matches!(err, SnapshotError::MalformedJson { ref body, .. } if body == "<html>nope</html>"));
    }

    #[test]
    fn test_urls() {
        let config = ClientConfig::default();
        let client = NestClient::new(config).unwrap();
        assert_eq!(
            client.api_url("/api/dropcam/share.login").unwrap().as_str(),
            "https://video.nest.com/api/dropcam/share.login"
        );
        assert_eq!(
            client
                .service_url("nexusapi-us1.camera.home.nest.com", "/get_image")
                .unwrap()
                .as_str(),
            "https://nexusapi-us1.camera.home.nest.com/get_image"
        );
    }

    #[test]
    fn test_session_cookie() {
        let session = SessionCredential::new("g.0.abc");
        let cookie = session_cookie(&session).unwrap();
        assert_eq!(cookie.to_str().unwrap(), "website_2=g.0.abc");

        let bad = SessionCredential::new("line\nbreak");
        assert!(session_cookie(&bad).is_err());
    }
}
