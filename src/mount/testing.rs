use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use super::error::MountError;
use super::transport::{DeviceInfo, DeviceKind, SerialProvider, SerialSettings, SerialTransport};

/// Serial provider that records opens, wire text and closes in one log.
#[derive(Clone, Default)]
pub struct Recorder {
    devices: Vec<DeviceInfo>,
    log: Arc<StdMutex<Vec<String>>>,
    denied: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
    permission_requests: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn usb(path: &str) -> DeviceInfo {
        DeviceInfo {
            path: path.into(),
            kind: DeviceKind::Usb {
                vid: 0x0403,
                pid: 0x6001,
                manufacturer: Some("FTDI".into()),
                product: None,
            },
        }
    }

    pub fn with_devices(devices: Vec<DeviceInfo>) -> Self {
        Self {
            devices,
            ..Self::default()
        }
    }

    pub fn single_usb() -> Self {
        Self::with_devices(vec![Self::usb("/dev/ttyUSB0")])
    }

    pub fn provider(&self) -> Box<dyn SerialProvider> {
        Box::new(self.clone())
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn deny_permission(&self, denied: bool) {
        self.denied.store(denied, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl SerialProvider for Recorder {
    fn devices(&self) -> Result<Vec<DeviceInfo>, MountError> {
        Ok(self.devices.clone())
    }

    fn request_permission(&self, _device: &DeviceInfo) {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn open(
        &self,
        device: &DeviceInfo,
        _settings: &SerialSettings,
    ) -> Result<Box<dyn SerialTransport>, MountError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(MountError::PermissionPending(device.path.clone()));
        }
        self.push(format!("<open {}>", device.path));
        Ok(Box::new(RecordingTransport {
            recorder: self.clone(),
        }))
    }
}

struct RecordingTransport {
    recorder: Recorder,
}

impl SerialTransport for RecordingTransport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.recorder.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out"));
        }
        self.recorder
            .push(String::from_utf8_lossy(bytes).into_owned());
        Ok(())
    }

    fn close(self: Box<Self>) {
        self.recorder.push("<close>".into());
    }
}
