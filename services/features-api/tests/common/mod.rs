//! Shared fixtures for the router tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use features_api::{
    build_router, AppState, AuthConfig, CollectionRegistry, CollectionsFile, ServiceConfig,
};
use features_protocol::{wkt, FeatureId, ItemsQuery};
use serde_json::{json, Map, Value};
use storage::{FeaturePage, FeatureRow, FeatureSource, FeatureStore, StorageError, StorageResult};
use tower::ServiceExt;

pub const USER: &str = "tester";
pub const PASSWORD: &str = "pa:ss";

/// Rows kept in id order; filtering and paging mimic the SQL statements.
pub struct MemoryStore {
    rows: Vec<FeatureRow>,
    calls: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self {
            rows,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::Decode("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl FeatureStore for MemoryStore {
    async fn fetch_items(
        &self,
        _source: &FeatureSource,
        query: &ItemsQuery,
    ) -> StorageResult<FeaturePage> {
        self.enter()?;
        if query.offset < 0 {
            return Err(StorageError::Decode("OFFSET must not be negative".to_string()));
        }

        let matching: Vec<&FeatureRow> = self
            .rows
            .iter()
            .filter(|row| match &query.bbox {
                None => true,
                Some(bbox) => wkt::decode(&row.wkt)
                    .map(|g| g.positions().all(|p| bbox.contains(p[0], p[1])))
                    .unwrap_or(false),
            })
            .collect();

        let rows = matching
            .iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .map(|row| (*row).clone())
            .collect();

        Ok(FeaturePage {
            rows,
            number_matched: matching.len() as u64,
        })
    }

    async fn fetch_item(
        &self,
        _source: &FeatureSource,
        id: &FeatureId,
    ) -> StorageResult<Option<FeatureRow>> {
        self.enter()?;
        Ok(self.rows.iter().find(|row| &row.id == id).cloned())
    }

    async fn ping(&self) -> StorageResult<()> {
        self.enter()
    }
}

fn row(id: i64, wkt: &str, med: f64) -> FeatureRow {
    let mut properties = Map::new();
    properties.insert("corpodagua".to_string(), json!(format!("Rio {}", id)));
    properties.insert("med".to_string(), json!(med));
    FeatureRow {
        id: FeatureId::Integer(id),
        wkt: wkt.to_string(),
        properties,
    }
}

/// Eight points inside the state of Rio de Janeiro, four outside it.
pub fn sample_rows() -> Vec<FeatureRow> {
    let mut rows: Vec<FeatureRow> = (1..=8)
        .map(|i| {
            let lon = -43.0 - (i as f64) * 0.1;
            row(i, &format!("POINT({} -22.5)", lon), i as f64 * 1.5)
        })
        .collect();
    rows.extend((9..=12).map(|i| row(i, "POINT(-50 -10)", 0.0)));
    rows
}

pub fn service() -> ServiceConfig {
    ServiceConfig::new("api")
}

pub fn app_with(store: Arc<dyn FeatureStore>, auth: AuthConfig, service: ServiceConfig) -> Router {
    let catalog = CollectionsFile::load("/nonexistent/collections.yaml").unwrap();
    let registry =
        CollectionRegistry::from_definitions(catalog.collections, &service.mount_path()).unwrap();
    build_router(Arc::new(AppState::new(registry, store, auth, service)))
}

pub fn auth() -> AuthConfig {
    AuthConfig::basic(USER, PASSWORD).with_realm("Test Realm")
}

/// Router with the sample rows behind Basic auth.
pub fn app() -> Router {
    app_with(Arc::new(MemoryStore::new(sample_rows())), auth(), service())
}

pub fn basic_header(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password)))
}

/// GET with valid credentials.
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "localhost:8080")
        .header(header::AUTHORIZATION, basic_header(USER, PASSWORD))
        .body(Body::empty())
        .unwrap()
}

/// GET without an Authorization header.
pub fn get_anonymous(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn content_type(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
