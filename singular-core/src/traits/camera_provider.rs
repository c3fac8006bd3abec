use std::sync::Arc;

use crate::models::device::DeviceInfo;
use crate::models::error::SensorError;
use crate::models::video_format::{VideoFormat, VideoFrame};

/// Returned by a frame callback to tell the camera whether to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDelivery {
    Continue,
    /// Stop delivering frames. The provider must not call back again.
    Halt,
}

/// Callback invoked with each captured frame.
pub type VideoFrameCallback = Arc<dyn Fn(&VideoFrame) -> FrameDelivery + Send + Sync + 'static>;

/// Interface for platform-specific cameras.
pub trait CameraProvider: Send + Sync {
    /// Information about the device backing this provider.
    fn device_info(&self) -> DeviceInfo;

    /// Formats the camera can stream, preferred first.
    fn supported_formats(&self) -> Vec<VideoFormat>;

    /// Start streaming `format`, delivering frames via `callback`.
    fn start(&mut self, format: VideoFormat, callback: VideoFrameCallback) -> Result<(), SensorError>;

    /// Stop streaming and release the device.
    fn stop(&mut self) -> Result<(), SensorError>;
}

impl<T: CameraProvider + ?Sized> CameraProvider for Box<T> {
    fn device_info(&self) -> DeviceInfo {
        (**self).device_info()
    }

    fn supported_formats(&self) -> Vec<VideoFormat> {
        (**self).supported_formats()
    }

    fn start(&mut self, format: VideoFormat, callback: VideoFrameCallback) -> Result<(), SensorError> {
        (**self).start(format, callback)
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        (**self).stop()
    }
}
