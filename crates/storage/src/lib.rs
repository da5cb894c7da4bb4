//! Storage abstractions for the features service.
//!
//! Provides:
//! - Query compilation for item listing and lookup against a spatial table
//! - The `FeatureStore` trait and its PostgreSQL/PostGIS implementation

pub mod error;
pub mod feature_store;
pub mod query;

pub use error::{StorageError, StorageResult};
pub use feature_store::{FeaturePage, FeatureRow, FeatureStore, PgFeatureStore};
pub use query::{compile_item, compile_items, FeatureSource, IdType, ItemsStatements, Statement};
