//! Typed configuration structures
//!
//! Everything a run needs is carried in these structs and handed to the
//! components explicitly. There is no process-wide state.

use crate::snapshot::{Result, SnapshotError};
use reqwest::header::HeaderValue;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL of the share API serving login and camera listing.
pub const DEFAULT_API_BASE: &str = "https://video.nest.com";

/// Scheme used to reach the per-camera snapshot host.
pub const DEFAULT_IMAGE_SCHEME: &str = "https";

/// Timeout applied to every outbound request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Requested snapshot width when none is given.
pub const DEFAULT_IMAGE_WIDTH: u32 = 512;

/// HTTP client configuration shared by every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL for the share API, without a trailing slash
    pub api_base: String,
    /// Scheme prepended to the service host returned by the camera listing
    pub image_scheme: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            image_scheme: DEFAULT_IMAGE_SCHEME.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Point the client at a different share API host.
    ///
    /// Both `http` and `https` are accepted so a local stand-in server can be
    /// used.
    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        let parsed = url::Url::parse(base)
            .map_err(|e| SnapshotError::InvalidInput(format!("invalid API base \"{base}\": {e}")))?;
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(SnapshotError::InvalidInput(format!(
                "API base must use http or https scheme, got \"{scheme}\""
            )));
        }
        self.api_base = base.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the scheme used for snapshot requests.
    pub fn with_image_scheme(mut self, scheme: &str) -> Result<Self> {
        match scheme {
            "http" | "https" => {
                self.image_scheme = scheme.to_string();
                Ok(self)
            }
            other => Err(SnapshotError::InvalidInput(format!(
                "image scheme must be http or https, got \"{other}\""
            ))),
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Size hint passed to the snapshot endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    /// Requested width in pixels; the server picks the height
    pub width: u32,
}

impl ImageSpec {
    pub fn new(width: u32) -> Result<Self> {
        if width == 0 {
            return Err(SnapshotError::InvalidInput(
                "width must be a positive integer".to_string(),
            ));
        }
        Ok(Self { width })
    }
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_WIDTH,
        }
    }
}

/// Container written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless PNG
    Png,
    /// JPEG at the encoder's default quality
    Jpeg,
}

impl OutputFormat {
    /// Derive the format from a path suffix. Only `.png` and `.jpeg` are
    /// recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".png") {
            Some(OutputFormat::Png)
        } else if name.ends_with(".jpeg") {
            Some(OutputFormat::Jpeg)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
        }
    }
}

/// Destination file plus the format implied by its suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl OutputTarget {
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = OutputFormat::from_path(&path)
            .ok_or_else(|| SnapshotError::UnsupportedFormat(path.display().to_string()))?;
        Ok(Self { path, format })
    }
}

/// Caller-supplied inputs for a single run.
#[derive(Clone)]
pub struct RunConfig {
    /// Public share token of the camera link
    pub access_token: String,
    /// Link password, `None` when the link is not protected
    pub password: Option<String>,
    pub image: ImageSpec,
    pub output: OutputTarget,
}

impl RunConfig {
    pub fn new(
        access_token: impl Into<String>,
        password: Option<String>,
        image: ImageSpec,
        output: OutputTarget,
    ) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(SnapshotError::InvalidInput(
                "missing required flag --token".to_string(),
            ));
        }
        // The token is echoed in the login Referer header
        if HeaderValue::from_str(&format!("/live/{}", access_token)).is_err() {
            return Err(SnapshotError::InvalidInput(
                "--token contains characters not allowed in a share link".to_string(),
            ));
        }
        Ok(Self {
            access_token,
            password: password.filter(|p| !p.is_empty()),
            image,
            output,
        })
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("access_token", &"[REDACTED]")
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("image", &self.image)
            .field("output", &self.output)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_suffix() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out.png")),
            Some(OutputFormat::Png)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("/tmp/shots/front.jpeg")),
            Some(OutputFormat::Jpeg)
        );
        assert_eq!(OutputFormat::from_path(Path::new("out.gif")), None);
        assert_eq!(OutputFormat::from_path(Path::new("out.jpg")), None);
        assert_eq!(OutputFormat::from_path(Path::new("out.PNG")), None);
        assert_eq!(OutputFormat::from_path(Path::new("png")), None);
    }

    #[test]
    fn test_output_target_rejects_unknown_suffix() {
        let err = OutputTarget::from_path("out.gif").unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedFormat(ref p) if p == "out.gif"));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, "https://video.nest.com");
        assert_eq!(config.image_scheme, "https");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_with_api_base_strips_trailing_slash() {
        let config = ClientConfig::default()
            .with_api_base("http://127.0.0.1:8080/")
            .unwrap();
        assert_eq!(config.api_base, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_with_api_base_rejects_other_schemes() {
        let err = ClientConfig::default()
            .with_api_base("ftp://video.nest.com")
            .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidInput(_)));
        assert!(ClientConfig::default().with_api_base("not a url").is_err());
    }

    #[test]
    fn test_with_image_scheme() {
        let config = ClientConfig::default().with_image_scheme("http").unwrap();
        assert_eq!(config.image_scheme, "http");
        assert!(ClientConfig::default().with_image_scheme("gopher").is_err());
    }

    #[test]
    fn test_run_config_rejects_control_characters_in_token() {
        let output = OutputTarget::from_path("out.png").unwrap();
        for token in ["abc\n123", "abc\r\nX-Injected: 1", "nul\0", "del\x7f"] {
            let err = RunConfig::new(token, None, ImageSpec::default(), output.clone()).unwrap_err();
            assert!(matches!(err, SnapshotError::InvalidInput(_)), "token {:?}", token);
        }
        assert!(RunConfig::new("abc123", None, ImageSpec::default(), output).is_ok());
    }

    #[test]
    fn test_image_spec_rejects_zero() {
        assert!(ImageSpec::new(0).is_err());
        assert_eq!(ImageSpec::new(640).unwrap().width, 640);
        assert_eq!(ImageSpec::default().width, 512);
    }

    #[test]
    fn test_run_config_drops_empty_password() {
        let output = OutputTarget::from_path("out.png").unwrap();
        let config =
            RunConfig::new("abc123", Some(String::new()), ImageSpec::default(), output).unwrap();
        assert_eq!(config.password, None);
    }

    #[test]
    fn test_run_config_requires_token() {
        let output = OutputTarget::from_path("out.png").unwrap();
        let err = RunConfig::new("  ", None, ImageSpec::default(), output).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidInput(_)));
    }

    #[test]
    fn test_run_config_debug_hides_secrets() {
        let output = OutputTarget::from_path("out.png").unwrap();
        let config = RunConfig::new(
            "abc123",
            Some("hunter2".to_string()),
            ImageSpec::default(),
            output,
        )
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("abc123"));
        assert!(!rendered.contains("hunter2"));
    }
}
