//! OpenAPI definition handler.

use axum::response::Response;
use features_protocol::{media_types, queries::MAX_LIMIT};
use serde_json::{json, Map, Value};

use super::{json_response, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;

/// `/{mount}/openapi`
pub fn openapi(state: &AppState, ctx: &RequestContext) -> Result<Response, ApiError> {
    json_response(media_types::JSON, &document(state, ctx))
}

/// Build the OpenAPI 3.0 document for the served routes.
pub fn document(state: &AppState, ctx: &RequestContext) -> Value {
    let mut doc = json!({
        "openapi": "3.0.3",
        "info": {
            "title": state.service.title,
            "description": state.service.description,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "servers": [{ "url": ctx.base_url(state) }],
        "paths": {
            "/": get_op("getLandingPage", "Landing page", json_content("#/components/schemas/LandingPage")),
            "/conformance": get_op("getConformance", "Conformance declaration", json_content("#/components/schemas/Conformance")),
            "/collections": get_op("getCollections", "Feature collections", json_content("#/components/schemas/Collections")),
            "/collections/{collectionId}": with_params(
                get_op("describeCollection", "Collection metadata", json_content("#/components/schemas/Collection")),
                vec![ref_param("collectionId")],
            ),
            "/collections/{collectionId}/items": with_params(
                get_op("getFeatures", "Features of a collection", geojson_content("#/components/schemas/FeatureCollection")),
                vec![
                    ref_param("collectionId"),
                    ref_param("limit"),
                    ref_param("offset"),
                    ref_param("bbox"),
                    ref_param("datetime"),
                    ref_param("properties"),
                ],
            ),
            "/collections/{collectionId}/items/{featureId}": with_params(
                get_op("getFeature", "A single feature", geojson_content("#/components/schemas/Feature")),
                vec![ref_param("collectionId"), ref_param("featureId")],
            ),
            "/collections/{collectionId}/queryables": with_params(
                get_op("getQueryables", "Queryable attributes", json_content("#/components/schemas/Queryables")),
                vec![ref_param("collectionId")],
            ),
            "/openapi": get_op("getOpenApi", "This API definition", content(media_types::JSON, json!({ "type": "object" }))),
        },
        "components": {
            "parameters": {
                "collectionId": path_param("collectionId", "Collection identifier"),
                "featureId": path_param("featureId", "Feature identifier"),
                "limit": {
                    "name": "limit",
                    "in": "query",
                    "required": false,
                    "schema": { "type": "integer", "minimum": 1, "maximum": MAX_LIMIT, "default": 10 },
                },
                "offset": {
                    "name": "offset",
                    "in": "query",
                    "required": false,
                    "schema": { "type": "integer", "default": 0 },
                },
                "bbox": {
                    "name": "bbox",
                    "in": "query",
                    "required": false,
                    "style": "form",
                    "explode": false,
                    "schema": {
                        "type": "array",
                        "minItems": 4,
                        "maxItems": 4,
                        "items": { "type": "number" },
                    },
                },
                "datetime": {
                    "name": "datetime",
                    "in": "query",
                    "required": false,
                    "schema": { "type": "string" },
                },
                "properties": {
                    "name": "properties",
                    "in": "query",
                    "required": false,
                    "schema": { "type": "string" },
                },
            },
            "schemas": schemas(),
        },
    });

    if state.auth.enabled {
        doc["components"]["securitySchemes"] = json!({
            "basicAuth": { "type": "http", "scheme": "basic" }
        });
        doc["security"] = json!([{ "basicAuth": [] }]);
    }

    doc
}

fn get_op(operation_id: &str, summary: &str, content: Value) -> Value {
    json!({
        "get": {
            "operationId": operation_id,
            "summary": summary,
            "responses": {
                "200": { "description": summary, "content": content },
                "default": {
                    "description": "Error",
                    "content": json_content("#/components/schemas/Exception"),
                },
            },
        }
    })
}

fn with_params(mut op: Value, parameters: Vec<Value>) -> Value {
    op["get"]["parameters"] = Value::Array(parameters);
    op
}

fn ref_param(name: &str) -> Value {
    json!({ "$ref": format!("#/components/parameters/{}", name) })
}

fn path_param(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "string" },
    })
}

fn content(media_type: &str, schema: Value) -> Value {
    let mut map = Map::new();
    map.insert(media_type.to_string(), json!({ "schema": schema }));
    Value::Object(map)
}

fn json_content(schema_ref: &str) -> Value {
    content(media_types::JSON, json!({ "$ref": schema_ref }))
}

fn geojson_content(schema_ref: &str) -> Value {
    content(media_types::GEO_JSON, json!({ "$ref": schema_ref }))
}

fn schemas() -> Value {
    let link = json!({
        "type": "object",
        "required": ["href", "rel"],
        "properties": {
            "href": { "type": "string" },
            "rel": { "type": "string" },
            "type": { "type": "string" },
            "title": { "type": "string" },
        },
    });
    let links = json!({ "type": "array", "items": { "$ref": "#/components/schemas/Link" } });

    json!({
        "Link": link,
        "LandingPage": {
            "type": "object",
            "required": ["links"],
            "properties": {
                "title": { "type": "string" },
                "description": { "type": "string" },
                "links": links,
            },
        },
        "Conformance": {
            "type": "object",
            "required": ["conformsTo"],
            "properties": {
                "conformsTo": { "type": "array", "items": { "type": "string" } },
            },
        },
        "Collection": {
            "type": "object",
            "required": ["id", "links"],
            "properties": {
                "id": { "type": "string" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "extent": { "type": "object" },
                "itemType": { "type": "string" },
                "crs": { "type": "array", "items": { "type": "string" } },
                "links": links,
            },
        },
        "Collections": {
            "type": "object",
            "required": ["collections", "links"],
            "properties": {
                "collections": { "type": "array", "items": { "$ref": "#/components/schemas/Collection" } },
                "links": links,
            },
        },
        "Geometry": {
            "type": "object",
            "required": ["type", "coordinates"],
            "properties": {
                "type": { "type": "string", "enum": ["Point", "MultiPoint", "LineString", "Polygon"] },
                "coordinates": { "type": "array" },
            },
        },
        "Feature": {
            "type": "object",
            "required": ["type", "id", "geometry", "properties"],
            "properties": {
                "type": { "type": "string", "enum": ["Feature"] },
                "id": { "oneOf": [{ "type": "integer" }, { "type": "string" }] },
                "geometry": { "$ref": "#/components/schemas/Geometry" },
                "properties": { "type": "object" },
            },
        },
        "FeatureCollection": {
            "type": "object",
            "required": ["type", "features"],
            "properties": {
                "type": { "type": "string", "enum": ["FeatureCollection"] },
                "features": { "type": "array", "items": { "$ref": "#/components/schemas/Feature" } },
                "links": links,
                "numberMatched": { "type": "integer", "minimum": 0 },
                "numberReturned": { "type": "integer", "minimum": 0 },
                "timeStamp": { "type": "string", "format": "date-time" },
            },
        },
        "Queryables": {
            "type": "object",
            "properties": {
                "$schema": { "type": "string" },
                "$id": { "type": "string" },
                "type": { "type": "string" },
                "title": { "type": "string" },
                "properties": { "type": "object" },
                "additionalProperties": { "type": "boolean" },
            },
        },
        "Exception": {
            "type": "object",
            "required": ["code", "description"],
            "properties": {
                "code": { "type": "string" },
                "description": { "type": "string" },
                "detail": { "type": "string" },
            },
        },
    })
}
