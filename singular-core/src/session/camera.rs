use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::console::{verbosity, Console};
use crate::models::device::{DeviceInfo, DeviceKind};
use crate::models::error::SensorError;
use crate::models::state::SessionState;
use crate::models::video_format::{VideoFormat, VideoFrame};
use crate::processing::frame_gate::FrameGate;
use crate::traits::camera_provider::{CameraProvider, FrameDelivery};
use crate::traits::sensor_listener::SensorListener;

use super::SessionShared;

/// One camera bound to a frame gate.
///
/// On start the first drawable format the camera offers is negotiated.
/// Frames that match it are forwarded as bitmaps; the first frame that
/// does not match stops the session for good and tells the camera to halt.
pub struct CameraSession<P: CameraProvider> {
    provider: P,
    device: DeviceInfo,
    gate: Arc<Mutex<FrameGate>>,
    shared: Arc<SessionShared>,
    frames: Arc<AtomicU64>,
    running: bool,
}

impl<P: CameraProvider> CameraSession<P> {
    pub fn new(id: usize, provider: P, listener: Arc<dyn SensorListener>, console: Console) -> Self {
        let device = provider.device_info();
        Self {
            provider,
            device,
            gate: Arc::new(Mutex::new(FrameGate::new())),
            shared: SessionShared::new(DeviceKind::Camera, id, listener, console),
            frames: Arc::new(AtomicU64::new(0)),
            running: false,
        }
    }

    pub fn id(&self) -> usize {
        self.shared.id
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Format negotiated at start, cleared once the gate halts.
    pub fn negotiated_format(&self) -> Option<VideoFormat> {
        self.gate.lock().negotiated()
    }

    /// Frames accepted since start.
    pub fn frames_accepted(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Negotiate a format and start streaming. Transitions: uninitialized → active.
    pub fn start(&mut self) -> Result<(), SensorError> {
        let state = self.shared.state();
        if !matches!(state, SessionState::Uninitialized) {
            return Err(SensorError::InvalidState(format!(
                "camera session {} cannot start from {}",
                self.shared.id,
                state.name()
            )));
        }

        let offered = self.provider.supported_formats();
        let Some(format) = offered.iter().copied().find(FrameGate::is_format_supported) else {
            self.shared
                .console
                .output("Camera format not supported, surface not started.", verbosity::INFO);
            let error = SensorError::UnsupportedFormat(format!(
                "{} offers no drawable format ({} offered)",
                self.device.name,
                offered.len()
            ));
            self.shared.fail(error.clone());
            return Err(error);
        };

        if let Err(e) = self.gate.lock().start(format) {
            self.shared.fail(e.clone());
            return Err(e);
        }
        self.shared
            .console
            .output("Starting video surface.", verbosity::INFO);

        let gate = Arc::clone(&self.gate);
        let shared = Arc::clone(&self.shared);
        let frames = Arc::clone(&self.frames);

        let callback = Arc::new(move |frame: &VideoFrame| -> FrameDelivery {
            let presented = gate.lock().present(frame);
            match presented {
                Ok(bitmap) => {
                    frames.fetch_add(1, Ordering::Relaxed);
                    shared.listener.on_camera_frame(shared.id, &bitmap);
                    FrameDelivery::Continue
                }
                Err(e) => {
                    shared
                        .console
                        .output("Frame error, stopping camera.", verbosity::INFO);
                    shared.fail(e);
                    FrameDelivery::Halt
                }
            }
        });

        // Must be active before the first frame arrives.
        self.shared.set_state(SessionState::Active);
        if let Err(e) = self.provider.start(format, callback) {
            log::error!("Failed to start camera {}: {}", self.device.name, e);
            self.shared.fail(e.clone());
            return Err(e);
        }

        self.running = true;
        self.shared.console.output(
            &format!("Camera started: {} ({})", self.device.name, format),
            verbosity::INFO,
        );
        Ok(())
    }

    /// Stop streaming and release the camera. Transitions: any → stopped.
    ///
    /// Also releases a camera whose session was already stopped by a
    /// rejected frame.
    pub fn stop(&mut self) -> Result<(), SensorError> {
        let result = if self.running {
            self.running = false;
            self.shared
                .console
                .output("Stopping video surface.", verbosity::INFO);
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

impl<P: CameraProvider> Drop for CameraSession<P> {
    fn drop(&mut self) {
        if self.running {
            if let Err(e) = self.provider.stop() {
                log::warn!("Failed to stop camera {}: {}", self.device.name, e);
            }
        }
    }
}
