//! In-memory catalog of served collections.

use std::collections::HashSet;

use features_protocol::Collection;
use storage::{FeatureSource, StorageError};
use thiserror::Error;

use crate::config::CollectionDefinition;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate collection id '{0}'")]
    DuplicateId(String),

    #[error("Collection '{id}': {source}")]
    InvalidSource {
        id: String,
        #[source]
        source: StorageError,
    },
}

/// A collection's public metadata together with its backing table.
#[derive(Debug, Clone)]
pub struct RegisteredCollection {
    /// Metadata with relative links.
    pub metadata: Collection,
    pub source: FeatureSource,
}

impl RegisteredCollection {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

/// Read-only collection catalog, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    collections: Vec<RegisteredCollection>,
}

impl CollectionRegistry {
    /// Build the catalog, keeping declaration order. Links are generated
    /// relative to `mount_path` (e.g. `/api`).
    pub fn from_definitions(
        definitions: Vec<CollectionDefinition>,
        mount_path: &str,
    ) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        let mut collections = Vec::with_capacity(definitions.len());

        for def in definitions {
            if !seen.insert(def.id.clone()) {
                return Err(RegistryError::DuplicateId(def.id));
            }

            let source = def.source();
            source.validate().map_err(|source| RegistryError::InvalidSource {
                id: def.id.clone(),
                source,
            })?;

            let mut metadata = Collection::new(&def.id, &def.title).with_crs(def.crs);
            if let Some(description) = def.description {
                metadata = metadata.with_description(description);
            }
            if let Some(extent) = def.extent {
                metadata = metadata.with_extent(extent);
            }
            metadata.build_links(mount_path);

            collections.push(RegisteredCollection { metadata, source });
        }

        tracing::debug!(count = collections.len(), "Collection registry built");
        Ok(Self { collections })
    }

    pub fn lookup(&self, id: &str) -> Option<&RegisteredCollection> {
        self.collections.iter().find(|c| c.id() == id)
    }

    /// All collections in declaration order.
    pub fn list(&self) -> &[RegisteredCollection] {
        &self.collections
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
