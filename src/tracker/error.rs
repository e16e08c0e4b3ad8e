use thiserror::Error;

use crate::mount::MountError;
use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("observer location unavailable")]
    ObserverUnavailable,
    #[error("tracker not running")]
    NotRunning,
    #[error("mount error: {0}")]
    Mount(#[from] MountError),
    #[error("predict error: {0}")]
    Predict(#[from] PredictError),
}
