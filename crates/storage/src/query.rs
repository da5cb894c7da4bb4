//! Query compilation for item listing and single-item lookup.
//!
//! User-controlled values never reach the SQL text: every bbox ordinate,
//! limit, offset and feature id is carried as a positional bind. Table and
//! column names come from the collection catalog and are checked to be plain
//! identifiers before they are quoted into a statement.

use features_protocol::crs::WGS84_SRID;
use features_protocol::{FeatureId, ItemsQuery, PropertyDefinition, PropertyType};
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Primary key type of a collection table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    #[default]
    Integer,
    String,
}

/// Where a collection's features live in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureSource {
    /// Table name.
    pub table: String,

    /// Primary key column, also used for ordering.
    pub id_column: String,

    /// Primary key type.
    pub id_type: IdType,

    /// Geometry column (SRID 4326).
    pub geometry_column: String,

    /// Attribute columns, emitted as feature properties.
    pub properties: Vec<PropertyDefinition>,
}

impl FeatureSource {
    /// Check every table and column name.
    pub fn validate(&self) -> StorageResult<()> {
        let names = [&self.table, &self.id_column, &self.geometry_column]
            .into_iter()
            .chain(self.properties.iter().map(|p| &p.name));
        for name in names {
            if !is_identifier(name) {
                return Err(StorageError::InvalidIdentifier(name.clone()));
            }
        }
        Ok(())
    }

    /// Interpret a path segment as a feature id of this source's key type.
    ///
    /// Returns `None` when the segment cannot be a key (e.g. non-numeric for
    /// integer keys), meaning no feature can match.
    pub fn parse_feature_id(&self, raw: &str) -> Option<FeatureId> {
        match self.id_type {
            IdType::Integer => raw.parse::<i64>().ok().map(FeatureId::Integer),
            IdType::String => Some(FeatureId::Text(raw.to_string())),
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name)
}

/// A positional bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Float(f64),
    Int(i64),
    Text(String),
}

/// SQL text plus its binds, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

/// The count and data statements of one items request.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemsStatements {
    /// Yields `numberMatched`.
    pub count: Statement,

    /// Yields the page of rows.
    pub data: Statement,
}

/// A WHERE clause shared verbatim by the count and data statements.
struct Filter {
    clause: String,
    binds: Vec<BindValue>,
}

impl Filter {
    fn build(source: &FeatureSource, query: &ItemsQuery) -> Self {
        let mut predicates = Vec::new();
        let mut binds = Vec::new();

        if let Some(bbox) = &query.bbox {
            let first = binds.len() + 1;
            predicates.push(format!(
                "ST_Within({}, ST_MakeEnvelope(${}, ${}, ${}, ${}, {}))",
                quote(&source.geometry_column),
                first,
                first + 1,
                first + 2,
                first + 3,
                WGS84_SRID
            ));
            binds.extend(bbox.to_array().into_iter().map(BindValue::Float));
        }

        let clause = if predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", predicates.join(" AND "))
        };

        Self { clause, binds }
    }
}

/// Column list in row order: id, WKT geometry, then each property.
fn select_list(source: &FeatureSource) -> String {
    let id_cast = match source.id_type {
        IdType::Integer => "bigint",
        IdType::String => "text",
    };
    let mut columns = vec![
        format!("{}::{}", quote(&source.id_column), id_cast),
        format!("ST_AsText({})", quote(&source.geometry_column)),
    ];
    columns.extend(source.properties.iter().map(|p| {
        let cast = match p.type_ {
            PropertyType::String => "text",
            PropertyType::Number => "double precision",
            PropertyType::Integer => "bigint",
        };
        format!("{}::{}", quote(&p.name), cast)
    }));
    columns.join(", ")
}

/// Compile the count and paginated data statements for an items request.
pub fn compile_items(source: &FeatureSource, query: &ItemsQuery) -> StorageResult<ItemsStatements> {
    source.validate()?;
    let filter = Filter::build(source, query);
    let table = quote(&source.table);

    let count = Statement {
        sql: format!("SELECT COUNT(*) FROM {}{}", table, filter.clause),
        binds: filter.binds.clone(),
    };

    let limit_idx = filter.binds.len() + 1;
    let mut data_binds = filter.binds;
    data_binds.push(BindValue::Int(query.limit));
    data_binds.push(BindValue::Int(query.offset));

    let data = Statement {
        sql: format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT ${} OFFSET ${}",
            select_list(source),
            table,
            filter.clause,
            quote(&source.id_column),
            limit_idx,
            limit_idx + 1
        ),
        binds: data_binds,
    };

    Ok(ItemsStatements { count, data })
}

/// Compile the single-feature lookup.
pub fn compile_item(source: &FeatureSource, id: &FeatureId) -> StorageResult<Statement> {
    source.validate()?;
    let bind = match id {
        FeatureId::Integer(v) => BindValue::Int(*v),
        FeatureId::Text(s) => BindValue::Text(s.clone()),
    };
    Ok(Statement {
        sql: format!(
            "SELECT {} FROM {} WHERE {} = $1",
            select_list(source),
            quote(&source.table),
            quote(&source.id_column)
        ),
        binds: vec![bind],
    })
}
