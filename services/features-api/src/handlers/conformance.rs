//! Conformance declaration handler.

use axum::response::Response;
use features_protocol::{media_types, ConformanceClasses};

use super::json_response;
use crate::error::ApiError;

pub fn conformance() -> Result<Response, ApiError> {
    json_response(media_types::JSON, &ConformanceClasses::current())
}
