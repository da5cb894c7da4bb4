//! Collection types.
//!
//! A collection is a dataset exposed through the API, backed by one table of
//! the spatial store. Collection metadata is immutable once the catalog is
//! loaded, and its links are kept relative to the server origin.

use serde::{Deserialize, Serialize};

use crate::media_types;
use crate::types::{resolve_links, Extent, Link};

/// A list of collections available from the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionList {
    /// The collections.
    pub collections: Vec<Collection>,

    /// Links to related resources.
    pub links: Vec<Link>,
}

impl CollectionList {
    /// Create a new collection list.
    pub fn new(collections: Vec<Collection>, links: Vec<Link>) -> Self {
        Self { collections, links }
    }
}

/// A feature collection's metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique identifier for the collection.
    pub id: String,

    /// Human-readable title.
    pub title: String,

    /// Detailed description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Spatial and temporal extent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,

    /// Kind of items served (always "feature").
    pub item_type: String,

    /// Coordinate reference systems supported.
    pub crs: Vec<String>,

    /// Links to related resources.
    pub links: Vec<Link>,
}

impl Collection {
    /// Create a new collection with required fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            extent: None,
            item_type: "feature".to_string(),
            crs: vec![crate::crs::CRS84.to_string()],
            links: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the extent.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Set supported CRS.
    pub fn with_crs(mut self, crs: Vec<String>) -> Self {
        self.crs = crs;
        self
    }

    /// Build the standard relative links for a collection under `mount_path`
    /// (e.g. `/api`).
    pub fn build_links(&mut self, mount_path: &str) {
        let collection_path = format!("{}/collections/{}", mount_path, self.id);
        self.links = vec![
            Link::new(&collection_path, "self")
                .with_type(media_types::JSON)
                .with_title(format!("Metadata for collection {}", self.id)),
            Link::new(format!("{}/items", collection_path), "items")
                .with_type(media_types::GEO_JSON)
                .with_title(format!("Items of collection {}", self.id)),
            Link::new(format!("{}/queryables", collection_path), "queryables")
                .with_type(media_types::SCHEMA_JSON)
                .with_title("Queryable attributes"),
        ];
    }

    /// Copy of this collection with its links resolved against `origin`,
    /// preceded by `leading` links (already absolute).
    pub fn resolved(&self, origin: &str, leading: &[Link]) -> Self {
        let mut links = leading.to_vec();
        links.extend(resolve_links(&self.links, origin));
        Self {
            links,
            ..self.clone()
        }
    }
}
