use crate::models::device::DeviceInfo;
use crate::models::error::SensorError;

use super::audio_provider::AudioInputProvider;
use super::camera_provider::CameraProvider;

/// Device discovery for one backend.
///
/// Listings are fresh on every call; hot-plugged devices show up on the
/// next enumeration.
pub trait DeviceCatalog: Send + Sync {
    fn cameras(&self) -> Result<Vec<DeviceInfo>, SensorError>;

    fn microphones(&self) -> Result<Vec<DeviceInfo>, SensorError>;

    fn speakers(&self) -> Result<Vec<DeviceInfo>, SensorError>;

    /// Open a provider for a camera returned by `cameras()`.
    fn open_camera(&self, device: &DeviceInfo) -> Result<Box<dyn CameraProvider>, SensorError>;

    /// Open a provider for a microphone returned by `microphones()`.
    fn open_microphone(&self, device: &DeviceInfo) -> Result<Box<dyn AudioInputProvider>, SensorError>;
}
