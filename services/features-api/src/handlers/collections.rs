//! Collection list and collection metadata handlers.

use axum::response::Response;
use features_protocol::{media_types, responses::landing_links, CollectionList};

use super::{collection_not_found, json_response, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;

/// `/{mount}/collections`
pub fn list_collections(state: &AppState, ctx: &RequestContext) -> Result<Response, ApiError> {
    let collections = state
        .registry
        .list()
        .iter()
        .map(|c| c.metadata.resolved(&ctx.origin, &[]))
        .collect();

    let list = CollectionList::new(collections, landing_links(&ctx.base_url(state)));
    json_response(media_types::JSON, &list)
}

/// `/{mount}/collections/{collectionId}`
pub fn get_collection(
    state: &AppState,
    ctx: &RequestContext,
    collection_id: &str,
) -> Result<Response, ApiError> {
    let collection = state
        .registry
        .lookup(collection_id)
        .ok_or_else(|| collection_not_found(collection_id))?;

    let leading = landing_links(&ctx.base_url(state));
    json_response(
        media_types::JSON,
        &collection.metadata.resolved(&ctx.origin, &leading),
    )
}
