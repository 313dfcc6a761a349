//! Share-link login
//!
//! Exchanges the public share token (and password, for protected links) for
//! a session credential used by every later call.

use super::client::{check_status, read_envelope, NestClient};
use super::{Result, SnapshotError};
use reqwest::header::REFERER;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// Login endpoint on the share API host.
pub const LOGIN_ENDPOINT: &str = "/api/dropcam/share.login";

/// Content type the login endpoint's form decoder expects.
pub const LOGIN_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Session credential issued by the login call.
///
/// Valid for the remainder of the run; it is never renewed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(String);

impl SessionCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential([REDACTED])")
    }
}

#[derive(Debug, Deserialize)]
struct LoginItem {
    #[serde(default)]
    session_token: String,
}

impl NestClient {
    /// Log in to a shared camera link.
    ///
    /// Succeeds only on `200 OK` with `status_description == "ok"` and exactly
    /// one item carrying a non-empty `session_token`.
    pub async fn authenticate(
        &self,
        access_token: &str,
        password: Option<&str>,
    ) -> Result<SessionCredential> {
        info!("creating new login session");

        let mut form = vec![("token", access_token)];
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            form.push(("password", password));
        }

        let url = self.api_url(LOGIN_ENDPOINT)?;
        debug!(url = %url, "making POST request");

        // `form` sets Content-Type to LOGIN_CONTENT_TYPE
        let response = self
            .http()
            .post(url)
            .header(REFERER, self.referer(access_token))
            .form(&form)
            .send()
            .await?;
        let response = check_status(response)?;

        let (items, body) = read_envelope::<LoginItem>(response, "login")
            .await?
            .into_ok_items()?;
        let session = single_session(items, body)?;

        info!("successfully created login session");
        Ok(session)
    }

    /// Referer the share page would send for this token.
    fn referer(&self, access_token: &str) -> String {
        format!("{}/live/{}", self.config().api_base, access_token)
    }
}

fn single_session(items: Vec<LoginItem>, body: String) -> Result<SessionCredential> {
    if items.len() != 1 {
        return Err(SnapshotError::UnexpectedItemCount {
            expected: "exactly one",
            actual: items.len(),
            body,
        });
    }
    let token = items.into_iter().next().map(|item| item.session_token);
    match token {
        Some(token) if !token.is_empty() => Ok(SessionCredential::new(token)),
        _ => Err(SnapshotError::MissingField {
            field: "session_token",
            body,
        }),
    }
}
