use serde::Serialize;
use serialport::{DataBits, Parity, SerialPort, SerialPortType, StopBits};
use std::io::{self, Write};
use std::time::Duration;
use utoipa::ToSchema;

use super::error::MountError;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceKind {
    Usb {
        vid: u16,
        pid: u16,
        manufacturer: Option<String>,
        product: Option<String>,
    },
    Pci,
    Bluetooth,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeviceInfo {
    pub path: String,
    pub kind: DeviceKind,
}

impl DeviceInfo {
    /// USB serial adapters are the only driver class the mount ships with.
    pub fn is_compatible(&self) -> bool {
        matches!(self.kind, DeviceKind::Usb { .. })
    }
}

/// Link parameters; frames are always 8N1.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Explicit device path; when unset the first compatible adapter is used.
    pub device: Option<String>,
    pub baud_rate: u32,
    pub write_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: None,
            baud_rate: DEFAULT_BAUD_RATE,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// An open serial handle.
pub trait SerialTransport: Send {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn close(self: Box<Self>) {}
}

/// Enumerates serial adapters and opens them.
pub trait SerialProvider: Send {
    fn devices(&self) -> Result<Vec<DeviceInfo>, MountError>;

    /// Asks the OS for access; completes out of band.
    fn request_permission(&self, device: &DeviceInfo);

    fn open(
        &self,
        device: &DeviceInfo,
        settings: &SerialSettings,
    ) -> Result<Box<dyn SerialTransport>, MountError>;
}

/// Provider backed by the host's serial ports.
#[derive(Debug, Default)]
pub struct SerialPortProvider;

impl SerialProvider for SerialPortProvider {
    fn devices(&self) -> Result<Vec<DeviceInfo>, MountError> {
        let ports =
            serialport::available_ports().map_err(|e| MountError::Enumerate(e.to_string()))?;
        Ok(ports
            .into_iter()
            .map(|port| DeviceInfo {
                path: port.port_name,
                kind: match port.port_type {
                    SerialPortType::UsbPort(usb) => DeviceKind::Usb {
                        vid: usb.vid,
                        pid: usb.pid,
                        manufacturer: usb.manufacturer,
                        product: usb.product,
                    },
                    SerialPortType::PciPort => DeviceKind::Pci,
                    SerialPortType::BluetoothPort => DeviceKind::Bluetooth,
                    SerialPortType::Unknown => DeviceKind::Unknown,
                },
            })
            .collect())
    }

    fn request_permission(&self, device: &DeviceInfo) {
        log::warn!(
            "Access to {} denied; grant read/write access to the device (e.g. dialout group) and retry",
            device.path
        );
    }

    fn open(
        &self,
        device: &DeviceInfo,
        settings: &SerialSettings,
    ) -> Result<Box<dyn SerialTransport>, MountError> {
        let port = serialport::new(device.path.as_str(), settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(settings.write_timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
                    MountError::PermissionPending(device.path.clone())
                }
                serialport::ErrorKind::NoDevice => MountError::DeviceNotFound,
                _ => MountError::Open {
                    device: device.path.clone(),
                    message: e.to_string(),
                },
            })?;
        Ok(Box::new(SerialPortTransport { port }))
    }
}

struct SerialPortTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport for SerialPortTransport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}
