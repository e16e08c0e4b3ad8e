use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::{MutexGuard, PoisonError};
use utoipa::ToSchema;

use crate::track::{generate_path, PathBook, TrackedPath};
use crate::web::api::error::{blocking, ApiError, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::state::AppState;
use crate::web::config::Permission;

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearedPaths {
    pub removed: usize,
}

fn lock_book(state: &AppState) -> MutexGuard<'_, PathBook> {
    state.paths.lock().unwrap_or_else(PoisonError::into_inner)
}

#[utoipa::path(
    get,
    path = "/api/paths",
    tag = "paths",
    responses(
        (status = 200, description = "Plotted paths in plot order", body = Vec<TrackedPath>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("api_key" = []))
)]
pub async fn list_paths(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<TrackedPath>>> {
    require_permission(&user, Permission::Read)?;
    Ok(Json(lock_book(&state).paths().to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/paths/{norad_id}",
    tag = "paths",
    params(("norad_id" = u32, Path, description = "NORAD catalog number")),
    responses(
        (status = 200, description = "Plotted path", body = TrackedPath),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Target not plotted", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn get_path(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(norad_id): Path<u32>,
) -> ApiResult<Json<TrackedPath>> {
    require_permission(&user, Permission::Read)?;
    lock_book(&state)
        .get(norad_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound("path_not_plotted", format!("no path plotted for NORAD {norad_id}"))
        })
}

#[utoipa::path(
    post,
    path = "/api/paths/{norad_id}",
    tag = "paths",
    params(("norad_id" = u32, Path, description = "NORAD catalog number")),
    responses(
        (status = 201, description = "Path generated and plotted", body = TrackedPath),
        (status = 400, description = "Every sample was filtered out or propagation failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Unknown target", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn plot_path(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(norad_id): Path<u32>,
) -> ApiResult<impl IntoResponse> {
    require_permission(&user, Permission::Control)?;

    let target = state.catalog.target(norad_id)?;
    let window = state.config.paths.window(Utc::now())?;
    let track = {
        let state = state.clone();
        let target = target.clone();
        blocking(move || {
            Ok(generate_path(
                state.propagator.as_ref(),
                &target,
                &window,
                &state.config.filter,
            )?)
        })
        .await?
    };
    log::info!(
        "{} plotted {} ({} points)",
        user.name,
        target.name,
        track.points.len()
    );

    let plotted = lock_book(&state).plot(track);
    Ok((StatusCode::CREATED, Json(plotted)))
}

#[utoipa::path(
    delete,
    path = "/api/paths",
    tag = "paths",
    responses(
        (status = 200, description = "All paths removed", body = ClearedPaths),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("api_key" = []))
)]
pub async fn clear_paths(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<ClearedPaths>> {
    require_permission(&user, Permission::Control)?;
    let removed = lock_book(&state).clear();
    Ok(Json(ClearedPaths { removed }))
}
