use thiserror::Error;

use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("empty path: every sample for NORAD {0} was filtered out")]
    EmptyPath(u32),
    #[error("invalid path window: {0}")]
    InvalidWindow(String),
    #[error("predict error: {0}")]
    Predict(#[from] PredictError),
}

#[derive(Debug, Error)]
pub enum RankError {
    #[error("observer location unavailable")]
    ObserverUnavailable,
    #[error("path error: {0}")]
    Path(#[from] PathError),
}
