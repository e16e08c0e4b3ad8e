use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("Invalid TLE for NORAD {norad_id}: {message}")]
    InvalidTle { norad_id: u32, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("Invalid observer: {0}")]
    InvalidObserver(String),
    #[error("Observer already set")]
    ObserverAlreadySet,
}
