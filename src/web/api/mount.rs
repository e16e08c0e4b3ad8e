use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::mount::{lock_mount, DeviceInfo, MountCommand};
use crate::web::api::error::{blocking, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::state::AppState;
use crate::web::config::Permission;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MountStatus {
    pub open: bool,
    pub device: Option<DeviceInfo>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Azimuth,
    Elevation,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct OffsetRequest {
    pub axis: Axis,
    pub degrees: f64,
}

impl OffsetRequest {
    fn command(&self) -> MountCommand {
        match self.axis {
            Axis::Azimuth => MountCommand::AzimuthOffset {
                degrees: self.degrees,
            },
            Axis::Elevation => MountCommand::ElevationOffset {
                degrees: self.degrees,
            },
        }
    }
}

fn mount_status(state: &AppState) -> MountStatus {
    let mount = lock_mount(&state.mount);
    MountStatus {
        open: mount.is_open(),
        device: mount.device().cloned(),
    }
}

#[utoipa::path(
    get,
    path = "/api/mount/devices",
    tag = "mount",
    responses(
        (status = 200, description = "Serial adapters present on the host", body = Vec<DeviceInfo>),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "Enumeration failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn list_devices(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<Vec<DeviceInfo>>> {
    require_permission(&user, Permission::Read)?;
    let mount = state.mount.clone();
    let devices = blocking(move || Ok(lock_mount(&mount).devices()?)).await?;
    Ok(Json(devices))
}

#[utoipa::path(
    post,
    path = "/api/mount/open",
    tag = "mount",
    responses(
        (status = 200, description = "Device open", body = MountStatus),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 409, description = "Access requested, retry once granted", body = ErrorResponse),
        (status = 503, description = "No compatible device or open failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn open(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MountStatus>> {
    require_permission(&user, Permission::Control)?;
    let mount = state.mount.clone();
    let device = blocking(move || Ok(lock_mount(&mount).open()?)).await?;
    log::info!("{} opened {}", user.name, device.path);
    Ok(Json(mount_status(&state)))
}

#[utoipa::path(
    post,
    path = "/api/mount/close",
    tag = "mount",
    responses(
        (status = 200, description = "Mount reset, parked and released", body = MountStatus),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions")
    ),
    security(("api_key" = []))
)]
pub async fn close(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MountStatus>> {
    require_permission(&user, Permission::Control)?;

    // A streaming session owns the stop sequence; end it instead of pulling
    // the handle from under it.
    let mut tracker = state.tracker.lock().await;
    if tracker.is_streaming() {
        log::info!("{} closed the mount during a session", user.name);
        tracker.stop().await?;
    } else {
        let mount = state.mount.clone();
        blocking(move || {
            let mut mount = lock_mount(&mount);
            if mount.is_open() {
                mount.park_and_close();
            }
            Ok(())
        })
        .await?;
    }
    drop(tracker);
    Ok(Json(mount_status(&state)))
}

#[utoipa::path(
    post,
    path = "/api/mount/offset",
    tag = "mount",
    request_body = OffsetRequest,
    responses(
        (status = 200, description = "Offset command sent", body = MountCommand),
        (status = 400, description = "Non-finite offset", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "Device not open or write failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn offset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<OffsetRequest>,
) -> ApiResult<Json<MountCommand>> {
    require_permission(&user, Permission::Control)?;
    let command = request.command();
    let mount = state.mount.clone();
    blocking(move || Ok(lock_mount(&mount).send(command)?)).await?;
    Ok(Json(command))
}

#[utoipa::path(
    post,
    path = "/api/mount/reset",
    tag = "mount",
    responses(
        (status = 200, description = "Reset command sent", body = MountCommand),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "Device not open or write failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn reset(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<MountCommand>> {
    require_permission(&user, Permission::Control)?;
    let mount = state.mount.clone();
    blocking(move || Ok(lock_mount(&mount).send(MountCommand::Reset)?)).await?;
    Ok(Json(MountCommand::Reset))
}
