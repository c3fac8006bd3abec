use singular_core::{AudioInputProvider, CameraProvider, DeviceCatalog, DeviceInfo, SensorError};

use crate::com::ComScope;
use crate::device_enumerator::DeviceEnumerator;
use crate::wasapi_mic::WasapiMicrophone;

/// Device catalog backed by the MMDevice API.
///
/// Audio endpoints only: cameras are never listed by this backend.
#[derive(Debug, Default)]
pub struct WindowsCatalog;

impl WindowsCatalog {
    pub fn new() -> Self {
        Self
    }

    fn with_enumerator<T>(
        &self,
        f: impl FnOnce(&DeviceEnumerator) -> Result<T, SensorError>,
    ) -> Result<T, SensorError> {
        let _com = ComScope::enter();
        let enumerator = DeviceEnumerator::new()?;
        f(&enumerator)
    }
}

impl DeviceCatalog for WindowsCatalog {
    fn cameras(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        log::info!("Camera capture is not available on the Windows backend");
        Ok(Vec::new())
    }

    fn microphones(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.with_enumerator(|e| e.list_capture_devices())
    }

    fn speakers(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.with_enumerator(|e| e.list_render_devices())
    }

    fn open_camera(&self, _device: &DeviceInfo) -> Result<Box<dyn CameraProvider>, SensorError> {
        Err(SensorError::DeviceNotAvailable)
    }

    fn open_microphone(&self, device: &DeviceInfo) -> Result<Box<dyn AudioInputProvider>, SensorError> {
        let microphone = self.with_enumerator(|e| WasapiMicrophone::open(e, device.clone()))?;
        Ok(Box::new(microphone))
    }
}
