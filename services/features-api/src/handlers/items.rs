//! Feature listing and single-feature handlers.

use axum::response::Response;
use chrono::Utc;
use features_protocol::{
    media_types, wkt, Feature, FeatureCollection, FeaturesError, ItemsQuery, Link,
    RawItemsParams,
};
use storage::FeatureRow;
use tracing::debug;

use super::{collection_not_found, json_response, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;

/// `/{mount}/collections/{collectionId}/items`
pub async fn list_items(
    state: &AppState,
    ctx: &RequestContext,
    collection_id: &str,
    pairs: &[(String, String)],
) -> Result<Response, ApiError> {
    let collection = state
        .registry
        .lookup(collection_id)
        .ok_or_else(|| collection_not_found(collection_id))?;

    let raw = RawItemsParams::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let query = ItemsQuery::from_raw(&raw);
    debug!(
        collection = collection_id,
        limit = query.limit,
        offset = query.offset,
        bbox = ?query.bbox,
        "Items query"
    );

    let page = state.store.fetch_items(&collection.source, &query).await?;
    let features = page
        .rows
        .into_iter()
        .map(row_to_feature)
        .collect::<Result<Vec<_>, _>>()?;

    let collection_url = format!("{}/collections/{}", ctx.base_url(state), collection_id);
    let links = vec![
        Link::new(format!("{}/items", collection_url), "self")
            .with_type(media_types::GEO_JSON)
            .with_title("This document"),
        Link::new(collection_url, "collection")
            .with_type(media_types::JSON)
            .with_title("The collection the items belong to"),
    ];

    let body = FeatureCollection::page(features, page.number_matched, links, Utc::now());
    json_response(media_types::GEO_JSON, &body)
}

/// `/{mount}/collections/{collectionId}/items/{featureId}`
pub async fn get_item(
    state: &AppState,
    collection_id: &str,
    feature_id: &str,
) -> Result<Response, ApiError> {
    let collection = state
        .registry
        .lookup(collection_id)
        .ok_or_else(|| collection_not_found(collection_id))?;

    let not_found = || ApiError::from(FeaturesError::FeatureNotFound(feature_id.to_string()));

    let id = collection
        .source
        .parse_feature_id(feature_id)
        .ok_or_else(not_found)?;
    let row = state
        .store
        .fetch_item(&collection.source, &id)
        .await?
        .ok_or_else(not_found)?;

    json_response(media_types::GEO_JSON, &row_to_feature(row)?)
}

fn row_to_feature(row: FeatureRow) -> Result<Feature, FeaturesError> {
    let geometry = wkt::decode(&row.wkt)?;
    Ok(Feature::new(row.id, geometry, row.properties))
}
