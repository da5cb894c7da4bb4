//! Queryables: the JSON Schema describing a collection's filterable attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON Schema dialect of the queryables document.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2019-09/schema";

/// Scalar type of a feature attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Integer,
}

/// A feature attribute exposed by a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDefinition {
    /// Attribute (and store column) name.
    pub name: String,

    /// Scalar type.
    #[serde(rename = "type")]
    pub type_: PropertyType,

    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, type_: PropertyType) -> Self {
        Self {
            name: name.into(),
            type_,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Schema entry for one queryable attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryableProperty {
    #[serde(rename = "type")]
    pub type_: PropertyType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Queryables document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Queryables {
    #[serde(rename = "$schema")]
    pub schema: String,

    #[serde(rename = "$id")]
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub title: String,

    pub properties: BTreeMap<String, QueryableProperty>,

    pub additional_properties: bool,
}

impl Queryables {
    /// Build the schema for a fixed attribute set. `id` is the absolute URL
    /// of the queryables resource.
    pub fn new(id: impl Into<String>, properties: &[PropertyDefinition]) -> Self {
        Self {
            schema: SCHEMA_DIALECT.to_string(),
            id: id.into(),
            type_: "object".to_string(),
            title: "Queryable attributes".to_string(),
            properties: properties
                .iter()
                .map(|p| {
                    (
                        p.name.clone(),
                        QueryableProperty {
                            type_: p.type_,
                            title: p.title.clone(),
                        },
                    )
                })
                .collect(),
            additional_properties: true,
        }
    }
}
