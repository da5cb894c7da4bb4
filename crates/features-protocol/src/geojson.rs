//! GeoJSON types for feature and feature collection responses.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc7946>

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Link;

/// A coordinate position: `[x, y]`, `[x, y, z]` or `[x, y, z, m]`.
pub type Position = Vec<f64>;

/// GeoJSON geometry types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A point geometry.
    Point {
        /// Coordinates as [longitude, latitude].
        coordinates: Position,
    },

    /// A set of points.
    MultiPoint {
        /// Array of positions.
        coordinates: Vec<Position>,
    },

    /// A line string geometry.
    LineString {
        /// Array of positions.
        coordinates: Vec<Position>,
    },

    /// A polygon geometry.
    Polygon {
        /// Array of linear rings (first is exterior, rest are holes).
        coordinates: Vec<Vec<Position>>,
    },

    /// A set of line strings.
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },

    /// A set of polygons.
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },

    /// A heterogeneous set of geometries.
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Create a 2D point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            coordinates: vec![x, y],
        }
    }

    /// Visit every position in the geometry.
    pub fn positions(&self) -> Box<dyn Iterator<Item = &Position> + '_> {
        match self {
            Geometry::Point { coordinates } => Box::new(std::iter::once(coordinates)),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                Box::new(coordinates.iter())
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                Box::new(coordinates.iter().flatten())
            }
            Geometry::MultiPolygon { coordinates } => {
                Box::new(coordinates.iter().flatten().flatten())
            }
            Geometry::GeometryCollection { geometries } => {
                Box::new(geometries.iter().flat_map(|g| g.positions()))
            }
        }
    }
}

/// A feature identifier, numeric or textual.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum FeatureId {
    /// Integer primary key.
    Integer(i64),
    /// Text primary key.
    Text(String),
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::Integer(v) => write!(f, "{}", v),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    /// Feature identifier.
    pub id: FeatureId,

    /// The geometry of this feature.
    pub geometry: Geometry,

    /// Attribute name to scalar value.
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Create a new feature.
    pub fn new(id: FeatureId, geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            type_: "Feature".to_string(),
            id,
            geometry,
            properties,
        }
    }
}

/// A page of features with pagination counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    /// Features of this page.
    pub features: Vec<Feature>,

    /// Links to related resources.
    pub links: Vec<Link>,

    /// Total number of features satisfying the filter.
    pub number_matched: u64,

    /// Number of features in this page.
    pub number_returned: u64,

    /// Response construction time (ISO-8601, UTC).
    pub time_stamp: String,
}

impl FeatureCollection {
    /// Build a page. `number_returned` is always taken from `features`.
    pub fn page(
        features: Vec<Feature>,
        number_matched: u64,
        links: Vec<Link>,
        time_stamp: DateTime<Utc>,
    ) -> Self {
        let number_returned = features.len() as u64;
        Self {
            type_: "FeatureCollection".to_string(),
            features,
            links,
            number_matched,
            number_returned,
            time_stamp: time_stamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
