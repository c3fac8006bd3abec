use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::console::{verbosity, Console};
use crate::models::audio_format::AudioFormat;
use crate::models::device::{DeviceInfo, DeviceKind};
use crate::models::error::SensorError;
use crate::models::state::SessionState;
use crate::processing::level_meter::LevelMeter;
use crate::traits::audio_provider::AudioInputProvider;
use crate::traits::sensor_listener::SensorListener;

use super::SessionShared;

/// One microphone bound to a level meter.
///
/// The format is settled when the session is built: the requested format
/// (or the device's preferred one) if the device supports it, otherwise the
/// nearest format the device offers. Every buffer delivered while active is
/// metered and reported as `on_microphone_level(id, level)`.
///
/// ```text
/// [AudioInputProvider] → raw bytes → [LevelMeter] → level 0..=100 → [SensorListener]
/// ```
pub struct MicrophoneSession<P: AudioInputProvider> {
    provider: P,
    device: DeviceInfo,
    meter: LevelMeter,
    shared: Arc<SessionShared>,
    buffers: Arc<AtomicU64>,
    running: bool,
}

impl<P: AudioInputProvider> MicrophoneSession<P> {
    pub fn new(
        id: usize,
        provider: P,
        requested: Option<AudioFormat>,
        listener: Arc<dyn SensorListener>,
        console: Console,
    ) -> Self {
        let device = provider.device_info();

        let mut format = requested.unwrap_or_else(|| provider.preferred_format());
        if !provider.is_format_supported(&format) {
            console.output("Audio format not supported, trying to use nearest.", verbosity::INFO);
            format = provider.nearest_format(&format);
        }

        let meter = LevelMeter::new(format.clone());
        if !meter.is_enabled() {
            console.output(
                &format!(
                    "Level metering disabled for {} bit {:?} samples.",
                    format.sample_size, format.sample_type
                ),
                verbosity::INFO,
            );
        }

        console.output(&format!("Device: {}", device.name), verbosity::TRACE);
        for line in format.describe() {
            console.output(&line, verbosity::TRACE);
        }

        Self {
            provider,
            device,
            meter,
            shared: SessionShared::new(DeviceKind::Microphone, id, listener, console),
            buffers: Arc::new(AtomicU64::new(0)),
            running: false,
        }
    }

    pub fn id(&self) -> usize {
        self.shared.id
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Format the device was opened with.
    pub fn format(&self) -> &AudioFormat {
        self.meter.format()
    }

    pub fn is_metering(&self) -> bool {
        self.meter.is_enabled()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Buffers received since start.
    pub fn buffers_received(&self) -> u64 {
        self.buffers.load(Ordering::Relaxed)
    }

    /// Open the device. Transitions: uninitialized → active.
    ///
    /// A failed start leaves the session stopped.
    pub fn start(&mut self) -> Result<(), SensorError> {
        let state = self.shared.state();
        if !matches!(state, SessionState::Uninitialized) {
            return Err(SensorError::InvalidState(format!(
                "microphone session {} cannot start from {}",
                self.shared.id,
                state.name()
            )));
        }

        let meter = self.meter.clone();
        let shared = Arc::clone(&self.shared);
        let buffers = Arc::clone(&self.buffers);

        let callback = Arc::new(move |data: &[u8]| {
            buffers.fetch_add(1, Ordering::Relaxed);
            if let Some(level) = meter.level(data) {
                shared.listener.on_microphone_level(shared.id, level);
            }
        });

        let shared = Arc::clone(&self.shared);
        let device = self.device.name.clone();
        let on_failure = Arc::new(move |e: SensorError| {
            log::error!("Microphone {} stopped capturing: {}", device, e);
            shared.fail(e);
        });

        self.shared.set_state(SessionState::Active);
        if let Err(e) = self.provider.start(self.meter.format(), callback, on_failure) {
            log::error!("Failed to start microphone {}: {}", self.device.name, e);
            self.shared.fail(e.clone());
            return Err(e);
        }

        self.running = true;
        self.shared.console.output(
            &format!("Audio-in device started: {}", self.device.name),
            verbosity::INFO,
        );
        Ok(())
    }

    /// Stop the device. Transitions: any → stopped. Stopping twice is a no-op.
    pub fn stop(&mut self) -> Result<(), SensorError> {
        let result = if self.running {
            self.running = false;
            self.provider.stop()
        } else {
            Ok(())
        };

        if !self.shared.state().is_stopped() {
            self.shared.set_state(SessionState::Stopped(None));
        }
        result
    }
}

impl<P: AudioInputProvider> Drop for MicrophoneSession<P> {
    fn drop(&mut self) {
        if self.running {
            if let Err(e) = self.provider.stop() {
                log::warn!("Failed to stop microphone {}: {}", self.device.name, e);
            }
        }
    }
}
