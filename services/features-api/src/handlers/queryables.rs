//! Queryables handler.

use axum::response::Response;
use features_protocol::{media_types, Queryables};

use super::{collection_not_found, json_response, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;

/// `/{mount}/collections/{collectionId}/queryables`
///
/// The properties are the collection's configured attribute set, not read
/// from the store schema.
pub fn queryables(
    state: &AppState,
    ctx: &RequestContext,
    collection_id: &str,
) -> Result<Response, ApiError> {
    let collection = state
        .registry
        .lookup(collection_id)
        .ok_or_else(|| collection_not_found(collection_id))?;

    let id = format!(
        "{}/collections/{}/queryables",
        ctx.base_url(state),
        collection_id
    );
    let schema = Queryables::new(id, &collection.source.properties);
    json_response(media_types::JSON, &schema)
}
