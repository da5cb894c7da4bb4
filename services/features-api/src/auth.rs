//! HTTP Basic authentication gate.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, Result};
use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

const BASIC_PREFIX: &str = "Basic ";

/// Configured credentials and realm.
#[derive(Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    pub username: String,
    pub password: String,
    pub realm: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .finish()
    }
}

impl AuthConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            username: String::new(),
            password: String::new(),
            realm: default_realm(),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            enabled: true,
            username: username.into(),
            password: password.into(),
            realm: default_realm(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Reject an enabled gate without both secrets.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && (self.username.is_empty() || self.password.is_empty()) {
            bail!("authentication is enabled but API_USR / API_PWD are not both set");
        }
        Ok(())
    }

    /// Evaluate an Authorization header.
    pub fn check(&self, header: Option<&HeaderValue>) -> Result<(), ApiError> {
        if !self.enabled {
            return Ok(());
        }

        let value = header
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with(BASIC_PREFIX))
            .ok_or_else(|| ApiError::Unauthorized {
                realm: self.realm.clone(),
            })?;

        let credentials = Credentials::decode(&value[BASIC_PREFIX.len()..])
            .ok_or_else(|| ApiError::BadRequest("Invalid authentication format.".to_string()))?;

        if credentials.username == self.username && credentials.password == self.password {
            Ok(())
        } else {
            warn!(username = %credentials.username, "Rejected credentials");
            Err(ApiError::Forbidden {
                realm: self.realm.clone(),
            })
        }
    }
}

fn default_realm() -> String {
    "OGC API Features".to_string()
}

/// A decoded `username:password` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Decode the base64 token of a Basic header. Splits on the first `:`,
    /// so passwords may contain colons.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = STANDARD.decode(token.trim()).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (username, password) = text.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Middleware guarding every route. Preflight requests pass through.
pub async fn require_basic_auth(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    match state.auth.check(request.headers().get(AUTHORIZATION)) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            debug!(path = %request.uri().path(), error = %err, "Authentication failed");
            err.into_response()
        }
    }
}
