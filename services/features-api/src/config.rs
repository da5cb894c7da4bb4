//! Service configuration and the YAML collection catalog.

use anyhow::{bail, Context, Result};
use features_protocol::{crs, Extent, PropertyDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storage::{FeatureSource, IdType};

/// Catalog used when no collections file is present.
const DEFAULT_CATALOG: &str = include_str!("../../../config/collections.yaml");

/// Settings shaping the served documents.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Mount point segment, e.g. `api`.
    pub mount: String,

    /// Origin used for link resolution instead of the request's own.
    pub public_url: Option<String>,

    /// Landing page title.
    pub title: String,

    /// Landing page description.
    pub description: String,

    /// Include raw error text in 500 bodies.
    pub expose_error_detail: bool,
}

impl ServiceConfig {
    pub fn new(mount: impl Into<String>) -> Self {
        Self {
            mount: mount.into().trim_matches('/').to_string(),
            public_url: None,
            title: "OGC API - Features Turbidez RJ".to_string(),
            description: "API de acesso aos dados de turbidez dos corpos d'água do Rio de Janeiro"
                .to_string(),
            expose_error_detail: true,
        }
    }

    /// The router matches the mount as a single path segment.
    pub fn validate(&self) -> Result<()> {
        if self.mount.is_empty() {
            bail!("mount point must not be empty");
        }
        if self.mount.contains('/') {
            bail!(
                "mount point '{}' must be a single path segment without '/'",
                self.mount
            );
        }
        Ok(())
    }

    /// Path of the mount point, e.g. `/api`.
    pub fn mount_path(&self) -> String {
        format!("/{}", self.mount)
    }
}

/// Top level of the collections YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsFile {
    pub collections: Vec<CollectionDefinition>,
}

impl CollectionsFile {
    /// Load the catalog from `path`, falling back to the embedded default
    /// when the file does not exist.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::warn!(
                "Collections file {} does not exist, using the built-in catalog",
                path
            );
            return Self::from_yaml(DEFAULT_CATALOG).context("Failed to parse built-in catalog");
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {}", path))?;
        let file = Self::from_yaml(&content).with_context(|| format!("Failed to parse: {}", path))?;

        tracing::info!(
            "Loaded {} collection(s) from {}",
            file.collections.len(),
            path
        );
        Ok(file)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// One collection as declared in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDefinition {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Backing table.
    pub table: String,

    #[serde(default = "default_id_column")]
    pub id_column: String,

    #[serde(default)]
    pub id_type: IdType,

    #[serde(default = "default_geometry_column")]
    pub geometry_column: String,

    #[serde(default)]
    pub extent: Option<Extent>,

    #[serde(default = "default_supported_crs")]
    pub crs: Vec<String>,

    /// Fixed attribute set of every feature.
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

impl CollectionDefinition {
    /// Where this collection's rows are read from.
    pub fn source(&self) -> FeatureSource {
        FeatureSource {
            table: self.table.clone(),
            id_column: self.id_column.clone(),
            id_type: self.id_type,
            geometry_column: self.geometry_column.clone(),
            properties: self.properties.clone(),
        }
    }
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_geometry_column() -> String {
    "geom".to_string()
}

fn default_supported_crs() -> Vec<String> {
    vec![crs::CRS84.to_string()]
}
