//! Core types shared by the navigational documents.

use serde::{Deserialize, Serialize};

use crate::crs;

/// A hyperlink to a related resource.
///
/// Links are used throughout the API to enable navigation and discovery.
/// Catalog links are stored with relative hrefs and resolved against the
/// requesting origin when a response is assembled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// The URI of the linked resource.
    pub href: String,

    /// The relationship type (e.g., "self", "data", "conformance").
    pub rel: String,

    /// The media type of the linked resource.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// A human-readable title for the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    /// Create a new link with required fields.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            type_: None,
            title: None,
        }
    }

    /// Set the media type.
    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether the href is relative to the server origin.
    pub fn is_relative(&self) -> bool {
        self.href.starts_with('/')
    }

    /// Resolve a relative href against an origin such as `https://host:8080`.
    ///
    /// Absolute hrefs are returned unchanged.
    pub fn resolve(&self, origin: &str) -> Self {
        if !self.is_relative() {
            return self.clone();
        }
        Self {
            href: format!("{}{}", origin.trim_end_matches('/'), self.href),
            ..self.clone()
        }
    }
}

/// Resolve every link of a slice against an origin.
pub fn resolve_links(links: &[Link], origin: &str) -> Vec<Link> {
    links.iter().map(|l| l.resolve(origin)).collect()
}

/// The spatial and temporal extent of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extent {
    /// The spatial extent of the collection.
    pub spatial: SpatialExtent,

    /// The temporal extent of the collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalExtent>,
}

/// Spatial extent as one or more bounding boxes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialExtent {
    /// Bounding boxes as `[minx, miny, maxx, maxy]`.
    pub bbox: Vec<[f64; 4]>,

    /// Coordinate reference system of the bounding boxes.
    #[serde(default = "default_crs")]
    pub crs: String,
}

fn default_crs() -> String {
    crs::CRS84.to_string()
}

/// Temporal extent as one or more intervals; `None` marks an open end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemporalExtent {
    /// Intervals as `[start, end]` ISO-8601 instants.
    pub interval: Vec<[Option<String>; 2]>,

    /// Temporal reference system.
    #[serde(default = "default_trs")]
    pub trs: String,
}

fn default_trs() -> String {
    crs::GREGORIAN.to_string()
}
