//! OGC API - Features service.
//!
//! Serves the collections of a PostGIS store under a single mount point:
//! landing page, conformance, collection metadata, paginated items with a
//! bbox filter, single items, queryables and the OpenAPI definition. All
//! routes sit behind an optional HTTP Basic gate.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod state;

pub use auth::AuthConfig;
pub use config::{CollectionDefinition, CollectionsFile, ServiceConfig};
pub use error::ApiError;
pub use registry::{CollectionRegistry, RegisteredCollection};
pub use routes::{build_router, Route};
pub use state::AppState;
