use thiserror::Error;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("no compatible serial device found")]
    DeviceNotFound,
    #[error("permission for {0} not granted yet, retry once access is allowed")]
    PermissionPending(String),
    #[error("failed to open {device}: {message}")]
    Open { device: String, message: String },
    #[error("mount device is not open")]
    NotOpen,
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("command has non-finite value: {0}")]
    NonFinite(String),
    #[error("device enumeration failed: {0}")]
    Enumerate(String),
}
