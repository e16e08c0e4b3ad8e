use axum::{
    extract::{Path, State},
    Json,
};

use crate::tracker::TrackerStatus;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::state::AppState;
use crate::web::config::Permission;

#[utoipa::path(
    post,
    path = "/api/tracker/start/{norad_id}",
    tag = "tracker",
    params(("norad_id" = u32, Path, description = "NORAD catalog number")),
    responses(
        (status = 200, description = "Streaming started", body = TrackerStatus),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Unknown target", body = ErrorResponse),
        (status = 503, description = "Observer not set or mount device not open", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn start(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(norad_id): Path<u32>,
) -> ApiResult<Json<TrackerStatus>> {
    require_permission(&user, Permission::Control)?;

    let target = state.catalog.target(norad_id)?;
    log::info!("{} requested tracking of {}", user.name, target.name);

    let mut tracker = state.tracker.lock().await;
    tracker.start(target).await?;
    Ok(Json(tracker.status()))
}

#[utoipa::path(
    post,
    path = "/api/tracker/stop",
    tag = "tracker",
    responses(
        (status = 200, description = "Mount reset, parked and released", body = TrackerStatus),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 409, description = "No session running", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn stop(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TrackerStatus>> {
    require_permission(&user, Permission::Control)?;
    let mut tracker = state.tracker.lock().await;
    tracker.stop().await?;
    Ok(Json(tracker.status()))
}

#[utoipa::path(
    get,
    path = "/api/tracker/status",
    tag = "tracker",
    responses(
        (status = 200, description = "Mode and last sample sent", body = TrackerStatus),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("api_key" = []))
)]
pub async fn status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<TrackerStatus>> {
    require_permission(&user, Permission::Read)?;
    let tracker = state.tracker.lock().await;
    Ok(Json(tracker.status()))
}
