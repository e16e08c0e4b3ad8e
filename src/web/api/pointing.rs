use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::tracker::{preview_pointing, PointingPreview, TrackerError};
use crate::web::api::error::{blocking, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::config::Permission;
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/pointing/{norad_id}",
    tag = "tracker",
    params(("norad_id" = u32, Path, description = "NORAD catalog number")),
    responses(
        (status = 200, description = "Look angles over the preview window", body = PointingPreview),
        (status = 400, description = "Propagation failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Unknown target", body = ErrorResponse),
        (status = 503, description = "Observer location not set", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn preview(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(norad_id): Path<u32>,
) -> ApiResult<Json<PointingPreview>> {
    require_permission(&user, Permission::Read)?;

    let target = state.catalog.target(norad_id)?;
    let observer = state
        .observer
        .get()
        .ok_or(TrackerError::ObserverUnavailable)?;
    let window = state.config.pointing.window(Utc::now())?;

    let preview = blocking(move || {
        Ok(preview_pointing(
            state.propagator.as_ref(),
            &target,
            &observer,
            &window,
        )?)
    })
    .await?;
    log::debug!(
        "Previewed {} look angles for {}",
        preview.samples.len(),
        preview.name
    );
    Ok(Json(preview))
}
