//! HTTP request handlers.

pub mod api;
pub mod collections;
pub mod conformance;
pub mod items;
pub mod landing;
pub mod queryables;

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Serialize;
use tracing::debug;

use features_protocol::FeaturesError;

use crate::error::ApiError;
use crate::routes::Route;
use crate::state::AppState;

/// Per-request values used to resolve links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Scheme and authority, e.g. `http://localhost:8080`.
    pub origin: String,
}

impl RequestContext {
    /// Use the configured public URL, else forwarded headers, the request
    /// target's own scheme and authority, then `Host`.
    pub fn from_request(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Self {
        if let Some(public) = &state.service.public_url {
            return Self {
                origin: public.trim_end_matches('/').to_string(),
            };
        }

        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        // Absolute-form targets and HTTP/2 carry scheme and authority in the URI
        let scheme = header_str("x-forwarded-proto")
            .or_else(|| uri.scheme_str())
            .unwrap_or("http");
        let host = header_str("x-forwarded-host")
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .or_else(|| header_str(header::HOST.as_str()))
            .unwrap_or("localhost");

        Self {
            origin: format!("{}://{}", scheme, host),
        }
    }

    /// Absolute URL of the mount point, e.g. `http://localhost:8080/api`.
    pub fn base_url(&self, state: &AppState) -> String {
        format!("{}/{}", self.origin, state.service.mount)
    }
}

/// GET entry point: resolve the route once, run its handler, map failures.
pub async fn dispatch(
    Extension(state): Extension<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    let segments: Vec<&str> = uri.path().split('/').filter(|s| !s.is_empty()).collect();
    let route = Route::resolve(&state.service.mount, &segments);
    let label = route.as_ref().map(Route::name).unwrap_or("not_found");

    metrics::counter!("features_requests_total", "route" => label).increment(1);
    debug!(path = %uri.path(), route = label, "Resolved route");

    let ctx = RequestContext::from_request(&state, &uri, &headers);
    let result = match route {
        Some(route) => match query {
            Ok(Query(pairs)) => handle(&state, &ctx, route, &pairs).await,
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        },
        None => Err(ApiError::NotFound("Endpoint not found".to_string())),
    };

    match result {
        Ok(response) => response,
        Err(err) if state.service.expose_error_detail => err.into_response(),
        Err(err) => err.without_detail().into_response(),
    }
}

async fn handle(
    state: &AppState,
    ctx: &RequestContext,
    route: Route,
    pairs: &[(String, String)],
) -> Result<Response, ApiError> {
    match route {
        Route::Landing => landing::landing_page(state, ctx, false),
        Route::DoubledLanding => landing::landing_page(state, ctx, true),
        Route::Conformance => conformance::conformance(),
        Route::Collections => collections::list_collections(state, ctx),
        Route::Collection { collection_id } => {
            collections::get_collection(state, ctx, &collection_id)
        }
        Route::Items { collection_id } => {
            items::list_items(state, ctx, &collection_id, pairs).await
        }
        Route::Item {
            collection_id,
            feature_id,
        } => items::get_item(state, &collection_id, &feature_id).await,
        Route::Queryables { collection_id } => {
            queryables::queryables(state, ctx, &collection_id)
        }
        Route::OpenApi => api::openapi(state, ctx),
    }
}

/// CORS preflight: 200 with no body.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Serialize `body` with the given content type.
pub(crate) fn json_response<T: Serialize>(
    content_type: &'static str,
    body: &T,
) -> Result<Response, ApiError> {
    let json = serde_json::to_string_pretty(body).map_err(ApiError::internal)?;
    Ok(([(header::CONTENT_TYPE, content_type)], json).into_response())
}

pub(crate) fn collection_not_found(id: &str) -> ApiError {
    FeaturesError::CollectionNotFound(id.to_string()).into()
}
