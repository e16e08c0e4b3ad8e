use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::CatalogError;
use crate::mount::MountError;
use crate::predict::PredictError;
use crate::track::{PathError, RankError};
use crate::tracker::TrackerError;
use crate::web::auth::PermissionError;

#[derive(Debug)]
pub enum ApiError {
    Permission(PermissionError),
    Validation(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Unavailable(&'static str, String),
    Internal(&'static str, String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Permission(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(..) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(..) => StatusCode::NOT_FOUND,
            ApiError::Conflict(..) => StatusCode::CONFLICT,
            ApiError::Unavailable(..) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(..) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PermissionError> for ApiError {
    fn from(e: PermissionError) -> Self {
        ApiError::Permission(e)
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::UnknownTarget(_) => ApiError::NotFound("unknown_target", e.to_string()),
            _ => ApiError::Unavailable("catalog_error", e.to_string()),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::InvalidTle { .. } | PredictError::Propagation(_) => {
                ApiError::Validation("propagation_failed", e.to_string())
            }
            PredictError::InvalidObserver(_) => {
                ApiError::Validation("invalid_observer", e.to_string())
            }
            PredictError::ObserverAlreadySet => {
                ApiError::Conflict("observer_already_set", e.to_string())
            }
        }
    }
}

impl From<PathError> for ApiError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::EmptyPath(_) => ApiError::Validation("empty_path", e.to_string()),
            PathError::InvalidWindow(_) => ApiError::Validation("invalid_window", e.to_string()),
            PathError::Predict(inner) => inner.into(),
        }
    }
}

impl From<RankError> for ApiError {
    fn from(e: RankError) -> Self {
        match e {
            RankError::ObserverUnavailable => {
                ApiError::Unavailable("observer_unavailable", e.to_string())
            }
            RankError::Path(inner) => inner.into(),
        }
    }
}

impl From<MountError> for ApiError {
    fn from(e: MountError) -> Self {
        let message = e.to_string();
        match e {
            MountError::PermissionPending(_) => ApiError::Conflict("permission_pending", message),
            MountError::NonFinite(_) => ApiError::Validation("non_finite", message),
            MountError::DeviceNotFound => ApiError::Unavailable("device_not_found", message),
            MountError::NotOpen => ApiError::Unavailable("device_not_open", message),
            MountError::Open { .. } => ApiError::Unavailable("open_failed", message),
            MountError::Write(_) => ApiError::Unavailable("write_failed", message),
            MountError::Enumerate(_) => ApiError::Unavailable("enumerate_failed", message),
        }
    }
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::ObserverUnavailable => {
                ApiError::Unavailable("observer_unavailable", e.to_string())
            }
            TrackerError::NotRunning => ApiError::Conflict("tracker_not_running", e.to_string()),
            TrackerError::Mount(inner) => inner.into(),
            TrackerError::Predict(inner) => inner.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Permission(e) => e.into_response(),
            ApiError::Validation(error, message)
            | ApiError::NotFound(error, message)
            | ApiError::Conflict(error, message)
            | ApiError::Unavailable(error, message)
            | ApiError::Internal(error, message) => {
                (status, Json(ErrorResponse::with_message(error, &message))).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Runs propagation or serial I/O on the blocking pool so it never stalls
/// the async workers.
pub async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        log::error!("Blocking task failed: {}", e);
        ApiError::Internal("task_failed", e.to_string())
    })?
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_status_codes() {
        assert_eq!(
            ApiError::from(CatalogError::UnknownTarget(7)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PathError::EmptyPath(7)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RankError::ObserverUnavailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(MountError::PermissionPending("/dev/ttyUSB0".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(TrackerError::Mount(MountError::DeviceNotFound)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(PathError::Predict(PredictError::Propagation("decayed".into())))
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn blocking_work_runs_off_the_runtime() {
        assert_eq!(blocking(|| Ok(3)).await.unwrap(), 3);
        let err = blocking(|| -> ApiResult<()> { panic!("worker died") })
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
