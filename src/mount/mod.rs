//! Serial link to the antenna mount controller.

mod dispatcher;
mod error;
mod protocol;
#[cfg(test)]
pub mod testing;
mod transport;

pub use dispatcher::{lock_mount, MountDispatcher, SharedMount};
pub use error::MountError;
pub use protocol::{mount_azimuth, MountCommand};
pub use transport::{DeviceInfo, DeviceKind, SerialPortProvider, SerialSettings};
