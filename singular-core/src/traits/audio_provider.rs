use std::sync::Arc;

use crate::models::audio_format::AudioFormat;
use crate::models::device::DeviceInfo;
use crate::models::error::SensorError;

/// Callback invoked with each raw buffer captured by an audio input.
///
/// The bytes are interleaved frames in the format the provider was
/// started with.
pub type AudioBufferCallback = Arc<dyn Fn(&[u8]) + Send + Sync + 'static>;

/// Callback invoked at most once when capture dies after a successful start.
pub type CaptureFailureCallback = Arc<dyn Fn(SensorError) + Send + Sync + 'static>;

/// Interface for platform-specific audio input devices.
///
/// Implemented by:
/// - `WasapiMicrophone` (Windows)
/// - `ToneMicrophone` (simulated)
pub trait AudioInputProvider: Send + Sync {
    /// Information about the device backing this provider.
    fn device_info(&self) -> DeviceInfo;

    /// Format the hardware prefers.
    fn preferred_format(&self) -> AudioFormat;

    /// Whether the device can deliver `format` exactly.
    fn is_format_supported(&self, format: &AudioFormat) -> bool;

    /// Closest format the device can deliver.
    fn nearest_format(&self, format: &AudioFormat) -> AudioFormat;

    /// Start capturing in `format`, delivering buffers via `callback`.
    ///
    /// The callback may fire on a dedicated capture thread. Keep it short.
    /// If capture fails after `start` has returned, the provider stops
    /// delivering buffers and reports the error through `on_failure`.
    fn start(
        &mut self,
        format: &AudioFormat,
        callback: AudioBufferCallback,
        on_failure: CaptureFailureCallback,
    ) -> Result<(), SensorError>;

    /// Stop capturing and release the device. Returns once no further
    /// callbacks will fire.
    fn stop(&mut self) -> Result<(), SensorError>;
}

impl<T: AudioInputProvider + ?Sized> AudioInputProvider for Box<T> {
    fn device_info(&self) -> DeviceInfo {
        (**self).device_info()
    }

    fn preferred_format(&self) -> AudioFormat {
        (**self).preferred_format()
    }

    fn is_format_supported(&self, format: &AudioFormat) -> bool {
        (**self).is_format_supported(format)
    }

    fn nearest_format(&self, format: &AudioFormat) -> AudioFormat {
        (**self).nearest_format(format)
    }

    fn start(
        &mut self,
        format: &AudioFormat,
        callback: AudioBufferCallback,
        on_failure: CaptureFailureCallback,
    ) -> Result<(), SensorError> {
        (**self).start(format, callback, on_failure)
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        (**self).stop()
    }
}
