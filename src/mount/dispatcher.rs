use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use super::error::MountError;
use super::protocol::MountCommand;
use super::transport::{DeviceInfo, DeviceKind, SerialProvider, SerialSettings, SerialTransport};

pub const PARK_AZIMUTH_DEG: f64 = 0.0;
pub const PARK_ELEVATION_DEG: f64 = 90.0;

pub type SharedMount = Arc<StdMutex<MountDispatcher>>;

pub fn lock_mount(mount: &SharedMount) -> MutexGuard<'_, MountDispatcher> {
    mount.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the single serial handle to the mount. Every command goes
/// through [`MountDispatcher::send`].
pub struct MountDispatcher {
    provider: Box<dyn SerialProvider>,
    settings: SerialSettings,
    port: Option<Box<dyn SerialTransport>>,
    device: Option<DeviceInfo>,
}

impl MountDispatcher {
    pub fn new(provider: Box<dyn SerialProvider>, settings: SerialSettings) -> Self {
        Self {
            provider,
            settings,
            port: None,
            device: None,
        }
    }

    pub fn shared(self) -> SharedMount {
        Arc::new(StdMutex::new(self))
    }

    pub fn devices(&self) -> Result<Vec<DeviceInfo>, MountError> {
        self.provider.devices()
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Device currently open, or the last one that was.
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    fn select_device(&self) -> Result<DeviceInfo, MountError> {
        let devices = self.provider.devices()?;
        match &self.settings.device {
            Some(path) => Ok(devices
                .into_iter()
                .find(|d| &d.path == path)
                .unwrap_or_else(|| DeviceInfo {
                    path: path.clone(),
                    kind: DeviceKind::Unknown,
                })),
            None => devices
                .into_iter()
                .find(DeviceInfo::is_compatible)
                .ok_or(MountError::DeviceNotFound),
        }
    }

    /// Opens the configured device, or the first compatible adapter.
    /// Fails with `PermissionPending` until the OS grants access.
    pub fn open(&mut self) -> Result<DeviceInfo, MountError> {
        if let (Some(_), Some(device)) = (&self.port, &self.device) {
            return Ok(device.clone());
        }
        let device = self.select_device()?;
        self.open_device(device)
    }

    /// Opens the last used device again.
    pub fn reopen(&mut self) -> Result<DeviceInfo, MountError> {
        match self.device.clone() {
            Some(device) if self.port.is_none() => self.open_device(device),
            _ => self.open(),
        }
    }

    fn open_device(&mut self, device: DeviceInfo) -> Result<DeviceInfo, MountError> {
        match self.provider.open(&device, &self.settings) {
            Ok(port) => {
                log::info!(
                    "Serial connection to {} opened at {} baud",
                    device.path,
                    self.settings.baud_rate
                );
                self.port = Some(port);
                self.device = Some(device.clone());
                Ok(device)
            }
            Err(MountError::PermissionPending(path)) => {
                log::info!("Requesting access to {}", path);
                self.provider.request_permission(&device);
                Err(MountError::PermissionPending(path))
            }
            Err(e) => Err(e),
        }
    }

    pub fn send(&mut self, command: MountCommand) -> Result<(), MountError> {
        if !command.is_finite() {
            return Err(MountError::NonFinite(format!("{:?}", command)));
        }
        let port = self.port.as_mut().ok_or(MountError::NotOpen)?;
        let wire = command.encode();
        port.write_all(wire.as_bytes())?;
        log::debug!("Transmitted: {}", wire.trim_end());
        Ok(())
    }

    /// Resets the mount, parks it and releases the handle. Write failures are
    /// logged; the handle is released regardless.
    pub fn park_and_close(&mut self) {
        if self.port.is_none() {
            log::warn!("Park requested but no mount device is open");
            return;
        }
        for command in [
            MountCommand::Reset,
            MountCommand::point(PARK_AZIMUTH_DEG, PARK_ELEVATION_DEG),
        ] {
            if let Err(e) = self.send(command) {
                log::error!("Stop sequence command {:?} failed: {}", command, e);
            }
        }
        self.close();
    }

    pub fn close(&mut self) {
        if let Some(port) = self.port.take() {
            port.close();
            if let Some(device) = &self.device {
                log::info!("Serial connection to {} closed", device.path);
            }
        }
    }
}
