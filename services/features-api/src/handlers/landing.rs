//! Landing page handler.

use axum::response::Response;
use features_protocol::{media_types, AuthenticationInfo, LandingPage};

use super::{json_response, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;

/// `/{mount}` and `/{mount}/{mount}`. The doubled form also describes the
/// authentication scheme when the gate is enabled.
pub fn landing_page(
    state: &AppState,
    ctx: &RequestContext,
    doubled: bool,
) -> Result<Response, ApiError> {
    let mut page = LandingPage::new(
        &state.service.title,
        &state.service.description,
        &ctx.base_url(state),
    );
    if doubled && state.auth.enabled {
        page = page.with_authentication(AuthenticationInfo::http_basic());
    }

    json_response(media_types::JSON, &page)
}
