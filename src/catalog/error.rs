use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE set {name}: {message}")]
    InvalidTle { name: String, message: String },
    #[error("Unknown target: NORAD {0}")]
    UnknownTarget(u32),
}
