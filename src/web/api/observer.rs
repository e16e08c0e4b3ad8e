use axum::{extract::State, Json};

use crate::predict::Observer;
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::state::AppState;
use crate::web::config::Permission;

#[utoipa::path(
    get,
    path = "/api/observer",
    tag = "observer",
    responses(
        (status = 200, description = "Observer location, null until set", body = Option<Observer>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("api_key" = []))
)]
pub async fn get_observer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Option<Observer>>> {
    require_permission(&user, Permission::Read)?;
    Ok(Json(state.observer.get()))
}

/// The observer can be set once; later attempts conflict.
#[utoipa::path(
    put,
    path = "/api/observer",
    tag = "observer",
    request_body = Observer,
    responses(
        (status = 200, description = "Observer stored", body = Observer),
        (status = 400, description = "Coordinates out of range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 409, description = "Observer already set", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn set_observer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<Observer>,
) -> ApiResult<Json<Observer>> {
    require_permission(&user, Permission::Control)?;

    let observer = Observer::new(
        request.latitude_deg,
        request.longitude_deg,
        request.altitude_m,
    )?;
    state.observer.set(observer)?;
    log::info!(
        "{} set observer to {:.4}, {:.4}",
        user.name,
        observer.latitude_deg,
        observer.longitude_deg
    );
    Ok(Json(observer))
}
