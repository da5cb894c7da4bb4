//! Feature store backed by PostgreSQL/PostGIS.

use std::time::Instant;

use async_trait::async_trait;
use features_protocol::{FeatureId, ItemsQuery, PropertyType};
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgConnection, PgPool, Postgres, Row};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::query::{compile_item, compile_items, BindValue, FeatureSource, IdType, Statement};

/// A feature as read from the store, geometry still in WKT.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub id: FeatureId,
    pub wkt: String,
    pub properties: Map<String, Value>,
}

/// One page of rows plus the total matching the same filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePage {
    pub rows: Vec<FeatureRow>,
    pub number_matched: u64,
}

/// Read access to collection features.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Count and fetch one page of features.
    async fn fetch_items(
        &self,
        source: &FeatureSource,
        query: &ItemsQuery,
    ) -> StorageResult<FeaturePage>;

    /// Fetch a single feature by id.
    async fn fetch_item(
        &self,
        source: &FeatureSource,
        id: &FeatureId,
    ) -> StorageResult<Option<FeatureRow>>;

    /// Check connectivity.
    async fn ping(&self) -> StorageResult<()>;
}

/// Feature store over a PostgreSQL connection pool.
pub struct PgFeatureStore {
    pool: PgPool,
    consistent_counts: bool,
}

impl PgFeatureStore {
    /// Create a new pool from a database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!(max_connections, "Connected to feature store");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            consistent_counts: false,
        }
    }

    /// Run the count and data statements in one REPEATABLE READ transaction
    /// so `numberMatched` and the page come from the same snapshot.
    pub fn with_consistent_counts(mut self, enabled: bool) -> Self {
        self.consistent_counts = enabled;
        self
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Feature store pool closed");
    }
}

#[async_trait]
impl FeatureStore for PgFeatureStore {
    async fn fetch_items(
        &self,
        source: &FeatureSource,
        query: &ItemsQuery,
    ) -> StorageResult<FeaturePage> {
        let statements = compile_items(source, query)?;

        if self.consistent_counts {
            let mut tx = self.pool.begin().await?;
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
                .execute(&mut *tx)
                .await?;
            let page = run_items(&mut *tx, source, &statements.count, &statements.data).await?;
            tx.commit().await?;
            Ok(page)
        } else {
            // Both statements share one connection but not one snapshot.
            let mut conn = self.pool.acquire().await?;
            run_items(&mut *conn, source, &statements.count, &statements.data).await
        }
    }

    async fn fetch_item(
        &self,
        source: &FeatureSource,
        id: &FeatureId,
    ) -> StorageResult<Option<FeatureRow>> {
        let statement = compile_item(source, id)?;
        let started = Instant::now();
        let row = bind_all(sqlx::query(&statement.sql), &statement.binds)
            .fetch_optional(&self.pool)
            .await?;
        record_duration("item", started);

        row.map(|r| decode_row(&r, source)).transpose()
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn run_items(
    conn: &mut PgConnection,
    source: &FeatureSource,
    count: &Statement,
    data: &Statement,
) -> StorageResult<FeaturePage> {
    let started = Instant::now();
    let total: i64 = bind_all(sqlx::query(&count.sql), &count.binds)
        .fetch_one(&mut *conn)
        .await?
        .try_get(0)?;
    record_duration("count", started);

    let started = Instant::now();
    let rows = bind_all(sqlx::query(&data.sql), &data.binds)
        .fetch_all(&mut *conn)
        .await?;
    record_duration("data", started);

    debug!(
        table = %source.table,
        matched = total,
        returned = rows.len(),
        "Fetched feature page"
    );

    let rows = rows
        .iter()
        .map(|r| decode_row(r, source))
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(FeaturePage {
        rows,
        number_matched: total.max(0) as u64,
    })
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    binds: &'q [BindValue],
) -> Query<'q, Postgres, PgArguments> {
    for bind in binds {
        query = match bind {
            BindValue::Float(v) => query.bind(*v),
            BindValue::Int(v) => query.bind(*v),
            BindValue::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn record_duration(statement: &'static str, started: Instant) {
    metrics::histogram!("features_query_duration_seconds", "statement" => statement)
        .record(started.elapsed().as_secs_f64());
}

/// Decode a row laid out as: id, WKT geometry, then properties in order.
fn decode_row(row: &PgRow, source: &FeatureSource) -> StorageResult<FeatureRow> {
    let id = match source.id_type {
        IdType::Integer => row.try_get::<Option<i64>, _>(0)?.map(FeatureId::Integer),
        IdType::String => row.try_get::<Option<String>, _>(0)?.map(FeatureId::Text),
    }
    .ok_or_else(|| StorageError::Decode(format!("null id in table '{}'", source.table)))?;

    let wkt: String = row
        .try_get::<Option<String>, _>(1)?
        .ok_or_else(|| StorageError::Decode(format!("feature {} has no geometry", id)))?;

    let mut properties = Map::new();
    for (offset, prop) in source.properties.iter().enumerate() {
        let idx = offset + 2;
        let value = match prop.type_ {
            PropertyType::String => row
                .try_get::<Option<String>, _>(idx)?
                .map(Value::String),
            PropertyType::Number => row
                .try_get::<Option<f64>, _>(idx)?
                .and_then(Number::from_f64)
                .map(Value::Number),
            PropertyType::Integer => row
                .try_get::<Option<i64>, _>(idx)?
                .map(|v| Value::Number(v.into())),
        };
        properties.insert(prop.name.clone(), value.unwrap_or(Value::Null));
    }

    Ok(FeatureRow {
        id,
        wkt,
        properties,
    })
}
