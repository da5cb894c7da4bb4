//! OGC API - Features Protocol
//!
//! This crate provides types and utilities for implementing an OGC API - Features
//! server: the navigational documents (landing page, conformance, collections),
//! the GeoJSON feature model, query parameter parsing and the WKT geometry codec.
//!
//! # Conformance Classes
//!
//! This implementation targets the following conformance classes:
//! - Features Core
//! - OpenAPI 3.0
//! - GeoJSON
//! - Common Core, Landing Page and JSON
//!
//! # Example
//!
//! ```rust
//! use features_protocol::{wkt, Geometry, LandingPage};
//!
//! let landing = LandingPage::new(
//!     "Water Quality Features",
//!     "Geo-referenced turbidity measurements",
//!     "http://localhost:8080/api",
//! );
//! assert!(landing.links.iter().any(|l| l.rel == "service-desc"));
//!
//! let point = wkt::decode("POINT(1 2)").unwrap();
//! assert_eq!(point, Geometry::point(1.0, 2.0));
//! ```

pub mod collections;
pub mod errors;
pub mod geojson;
pub mod queries;
pub mod queryables;
pub mod responses;
pub mod types;
pub mod wkt;

// Re-export commonly used types
pub use collections::{Collection, CollectionList};
pub use errors::FeaturesError;
pub use geojson::{Feature, FeatureCollection, FeatureId, Geometry, Position};
pub use queries::{Bbox, ItemsQuery, RawItemsParams};
pub use queryables::{PropertyDefinition, PropertyType, Queryables};
pub use responses::{AuthenticationInfo, ConformanceClasses, ExceptionResponse, LandingPage};
pub use types::{Extent, Link, SpatialExtent, TemporalExtent};

/// Conformance class URIs declared by the server.
pub mod conformance {
    /// Features Part 1 core.
    pub const FEATURES_CORE: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core";
    /// OpenAPI 3.0 service description.
    pub const FEATURES_OAS30: &str =
        "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/oas30";
    /// GeoJSON encoding of features.
    pub const FEATURES_GEOJSON: &str =
        "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/geojson";
    /// Common Part 1 core.
    pub const COMMON_CORE: &str = "http://www.opengis.net/spec/ogcapi-common-1/1.0/conf/core";
    /// Common landing page.
    pub const COMMON_LANDING_PAGE: &str =
        "http://www.opengis.net/spec/ogcapi-common-1/1.0/conf/landing-page";
    /// Common JSON encoding.
    pub const COMMON_JSON: &str = "http://www.opengis.net/spec/ogcapi-common-1/1.0/conf/json";
}

/// Media types used in responses and links.
pub mod media_types {
    /// GeoJSON media type
    pub const GEO_JSON: &str = "application/geo+json";
    /// JSON media type
    pub const JSON: &str = "application/json";
    /// JSON Schema media type
    pub const SCHEMA_JSON: &str = "application/schema+json";
    /// OpenAPI JSON media type as advertised in the landing page
    pub const OPENAPI_JSON: &str = "application/vnd.oai.openapi+json;version=3.0";
}

/// Coordinate and temporal reference system URIs.
pub mod crs {
    /// WGS84 longitude/latitude.
    pub const CRS84: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";
    /// Gregorian calendar.
    pub const GREGORIAN: &str = "http://www.opengis.net/def/uom/ISO-8601/0/Gregorian";
    /// SRID of the spatial store for bbox envelopes.
    pub const WGS84_SRID: i32 = 4326;
}
