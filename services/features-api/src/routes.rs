//! Route table and router construction.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::get,
    Extension, Router,
};
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use crate::auth::require_basic_auth;
use crate::handlers;
use crate::state::AppState;

/// The resources served under the mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    /// `/{mount}/{mount}`, served for clients that double the mount path.
    DoubledLanding,
    Conformance,
    Collections,
    Collection {
        collection_id: String,
    },
    Items {
        collection_id: String,
    },
    Item {
        collection_id: String,
        feature_id: String,
    },
    Queryables {
        collection_id: String,
    },
    OpenApi,
}

impl Route {
    /// Match non-empty path segments against the table. Matching is on exact
    /// segment count and literal values.
    pub fn resolve(mount: &str, segments: &[&str]) -> Option<Self> {
        let (first, rest) = segments.split_first()?;
        if *first != mount {
            return None;
        }

        let route = match rest {
            [] => Route::Landing,
            [second] if *second == mount => Route::DoubledLanding,
            ["conformance"] => Route::Conformance,
            ["collections"] => Route::Collections,
            ["openapi"] => Route::OpenApi,
            ["collections", id] => Route::Collection {
                collection_id: id.to_string(),
            },
            ["collections", id, "items"] => Route::Items {
                collection_id: id.to_string(),
            },
            ["collections", id, "queryables"] => Route::Queryables {
                collection_id: id.to_string(),
            },
            ["collections", id, "items", fid] => Route::Item {
                collection_id: id.to_string(),
                feature_id: fid.to_string(),
            },
            _ => return None,
        };
        Some(route)
    }

    /// Label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Landing => "landing",
            Route::DoubledLanding => "landing_doubled",
            Route::Conformance => "conformance",
            Route::Collections => "collections",
            Route::Collection { .. } => "collection",
            Route::Items { .. } => "items",
            Route::Item { .. } => "item",
            Route::Queryables { .. } => "queryables",
            Route::OpenApi => "openapi",
        }
    }
}

/// Build the application router.
///
/// Every path is routed through [`handlers::dispatch`]; the CORS headers are
/// set on every response, including auth failures and 404s.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::dispatch).options(handlers::preflight),
        )
        .route(
            "/*path",
            get(handlers::dispatch).options(handlers::preflight),
        )
        .layer(middleware::from_fn(require_basic_auth))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
}
