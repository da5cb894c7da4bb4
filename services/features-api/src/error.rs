//! Mapping of failures onto protocol error bodies.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use features_protocol::{media_types, ExceptionResponse, FeaturesError};
use storage::StorageError;
use thiserror::Error;

/// Terminal request failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or non-Basic Authorization header.
    #[error("Authentication required")]
    Unauthorized { realm: String },

    /// Credentials did not match.
    #[error("Invalid credentials")]
    Forbidden { realm: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal { detail: Option<String> },
}

impl ApiError {
    pub fn internal(detail: impl ToString) -> Self {
        ApiError::Internal {
            detail: Some(detail.to_string()),
        }
    }

    /// Drop the raw error text from 500 responses.
    pub fn without_detail(self) -> Self {
        match self {
            ApiError::Internal { .. } => ApiError::Internal { detail: None },
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_exception(&self) -> ExceptionResponse {
        match self {
            ApiError::Unauthorized { .. } => {
                ExceptionResponse::unauthorized("Authentication required. Use HTTP Basic Auth.")
            }
            ApiError::Forbidden { .. } => ExceptionResponse::forbidden("Invalid credentials."),
            ApiError::BadRequest(msg) => ExceptionResponse::bad_request(msg.as_str()),
            ApiError::NotFound(msg) => ExceptionResponse::not_found(msg.as_str()),
            ApiError::Internal { detail } => {
                let exc = ExceptionResponse::internal_error("Internal server error");
                match detail {
                    Some(detail) => exc.with_detail(detail.as_str()),
                    None => exc,
                }
            }
        }
    }

    fn challenge(&self) -> Option<String> {
        match self {
            ApiError::Unauthorized { realm } | ApiError::Forbidden { realm } => {
                Some(format!("Basic realm=\"{}\"", realm))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self.to_exception()).unwrap_or_else(|_| {
            r#"{"code":"InternalServerError","description":"Internal server error"}"#.to_string()
        });

        let mut response = (
            self.status_code(),
            [(header::CONTENT_TYPE, media_types::JSON)],
            body,
        )
            .into_response();

        if let Some(challenge) = self.challenge() {
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}

impl From<FeaturesError> for ApiError {
    fn from(err: FeaturesError) -> Self {
        match err {
            FeaturesError::CollectionNotFound(_) | FeaturesError::FeatureNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            FeaturesError::InvalidParameter(_) => ApiError::BadRequest(err.to_string()),
            FeaturesError::InvalidWkt(_) => ApiError::internal(err),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Feature store failure");
        ApiError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_carries_challenge() {
        let response = ApiError::Unauthorized {
            realm: "Test".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"Test\""
        );
        let json = body_json(response).await;
        assert_eq!(json["code"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_forbidden_carries_challenge() {
        let response = ApiError::Forbidden {
            realm: "Test".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_internal_detail_and_strip() {
        let err = ApiError::internal("connection refused");
        let json = body_json(err.into_response()).await;
        assert_eq!(json["code"], "InternalServerError");
        assert_eq!(json["description"], "Internal server error");
        assert_eq!(json["detail"], "connection refused");

        let stripped = ApiError::internal("connection refused").without_detail();
        let json = body_json(stripped.into_response()).await;
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_from_features_error() {
        let err: ApiError = FeaturesError::CollectionNotFound("x".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(matches!(&err, ApiError::NotFound(d) if d == "Collection 'x' not found"));

        let err: ApiError = FeaturesError::InvalidParameter("limit".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = FeaturesError::InvalidWkt("POINT(".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::Internal { detail: Some(d) } if d.contains("POINT(")));
    }

    #[test]
    fn test_bad_request_content_type() {
        let response = ApiError::BadRequest("Invalid authentication format.".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
