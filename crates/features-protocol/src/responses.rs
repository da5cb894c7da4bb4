//! Response types for the landing page, conformance declaration
//! and exception bodies.

use serde::{Deserialize, Serialize};

use crate::conformance;
use crate::media_types;
use crate::types::Link;

/// Landing page response for the API root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingPage {
    /// Title of the API.
    pub title: String,

    /// Description of the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Links to related resources.
    pub links: Vec<Link>,

    /// Authentication scheme, advertised on the doubled-mount landing page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationInfo>,
}

impl LandingPage {
    /// Create a new landing page with the standard links under `base_url`
    /// (origin plus mount point, e.g. `http://localhost:8080/api`).
    pub fn new(title: impl Into<String>, description: impl Into<String>, base_url: &str) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            links: landing_links(base_url),
            authentication: None,
        }
    }

    /// Attach an authentication descriptor.
    pub fn with_authentication(mut self, auth: AuthenticationInfo) -> Self {
        self.authentication = Some(auth);
        self
    }
}

/// The navigation links every landing page carries.
pub fn landing_links(base_url: &str) -> Vec<Link> {
    vec![
        Link::new(base_url, "self")
            .with_type(media_types::JSON)
            .with_title("This API (landing page)"),
        Link::new(format!("{}/conformance", base_url), "conformance")
            .with_type(media_types::JSON)
            .with_title("OGC API conformance declaration"),
        Link::new(format!("{}/collections", base_url), "data")
            .with_type(media_types::JSON)
            .with_title("Available data collections"),
        Link::new(format!("{}/openapi", base_url), "service-desc")
            .with_type(media_types::OPENAPI_JSON)
            .with_title("OpenAPI 3.0 definition"),
    ]
}

/// Description of the authentication scheme guarding the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticationInfo {
    /// Security scheme type.
    #[serde(rename = "type")]
    pub type_: String,

    /// HTTP authentication scheme.
    pub scheme: String,

    /// Human-readable description.
    pub description: String,
}

impl AuthenticationInfo {
    /// HTTP Basic authentication.
    pub fn http_basic() -> Self {
        Self {
            type_: "http".to_string(),
            scheme: "basic".to_string(),
            description: "HTTP Basic Authentication required".to_string(),
        }
    }
}

/// Conformance declaration response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConformanceClasses {
    /// List of conformance class URIs.
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
}

impl ConformanceClasses {
    /// Conformance classes for the current implementation.
    pub fn current() -> Self {
        Self {
            conforms_to: [
                conformance::FEATURES_CORE,
                conformance::FEATURES_OAS30,
                conformance::FEATURES_GEOJSON,
                conformance::COMMON_CORE,
                conformance::COMMON_LANDING_PAGE,
                conformance::COMMON_JSON,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Exception body: `{code, description, detail?}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionResponse {
    /// Error code (e.g. "NotFound").
    pub code: String,

    /// Human-readable description.
    pub description: String,

    /// Underlying error message, when exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExceptionResponse {
    /// Create a new exception response.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            detail: None,
        }
    }

    /// Set the detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// 401 body.
    pub fn unauthorized(description: impl Into<String>) -> Self {
        Self::new("Unauthorized", description)
    }

    /// 403 body.
    pub fn forbidden(description: impl Into<String>) -> Self {
        Self::new("Forbidden", description)
    }

    /// 400 body.
    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new("BadRequest", description)
    }

    /// 404 body.
    pub fn not_found(description: impl Into<String>) -> Self {
        Self::new("NotFound", description)
    }

    /// 500 body.
    pub fn internal_error(description: impl Into<String>) -> Self {
        Self::new("InternalServerError", description)
    }
}
