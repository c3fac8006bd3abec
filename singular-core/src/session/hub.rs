use std::sync::Arc;

use crate::console::text_stream::TextStream;
use crate::console::{verbosity, Console};
use crate::models::config::SensorConfiguration;
use crate::models::device::{default_index, DeviceInfo, DeviceKind};
use crate::models::error::SensorError;
use crate::models::state::SessionState;
use crate::traits::audio_provider::AudioInputProvider;
use crate::traits::camera_provider::CameraProvider;
use crate::traits::device_catalog::DeviceCatalog;
use crate::traits::sensor_listener::SensorListener;

use super::camera::CameraSession;
use super::microphone::MicrophoneSession;

type DynCameraSession = CameraSession<Box<dyn CameraProvider>>;
type DynMicrophoneSession = MicrophoneSession<Box<dyn AudioInputProvider>>;

/// Owns every device session of one backend.
///
/// - One camera session per detected camera, all active at once. Session
///   ids are the camera's index in the catalog listing.
/// - At most one microphone session. Switching microphones stops and drops
///   the current session before building the next one.
///
/// Generic over the backend via `DeviceCatalog`.
pub struct SensorHub<C: DeviceCatalog> {
    catalog: C,
    config: SensorConfiguration,
    console: Console,
    listener: Arc<dyn SensorListener>,
    text_stream: Option<TextStream>,

    cameras: Vec<DynCameraSession>,
    camera_devices: Vec<DeviceInfo>,

    microphone: Option<DynMicrophoneSession>,
    microphone_devices: Vec<DeviceInfo>,
    selected_microphone: Option<usize>,
    next_microphone_id: usize,
}

impl<C: DeviceCatalog> SensorHub<C> {
    pub fn new(
        catalog: C,
        config: SensorConfiguration,
        listener: Arc<dyn SensorListener>,
    ) -> Result<Self, SensorError> {
        config.validate().map_err(SensorError::ConfigurationFailed)?;

        let console = Console::new(config.verbosity, config.console_history);
        console.set_listener(Arc::clone(&listener));
        let text_stream = config
            .enable_text_stream
            .then(|| TextStream::new(console.clone()));

        Ok(Self {
            catalog,
            config,
            console,
            listener,
            text_stream,
            cameras: Vec::new(),
            camera_devices: Vec::new(),
            microphone: None,
            microphone_devices: Vec::new(),
            selected_microphone: None,
            next_microphone_id: 0,
        })
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn config(&self) -> &SensorConfiguration {
        &self.config
    }

    /// Start every enabled device class.
    pub fn start(&mut self) -> Result<(), SensorError> {
        if self.config.enable_cameras {
            self.start_cameras()?;
        }
        if self.config.enable_microphone {
            self.start_microphones()?;
        }
        Ok(())
    }

    /// Build and start one session per detected camera.
    ///
    /// A camera that fails to open or start is logged and skipped; the
    /// others still start. Returns the number of active cameras.
    pub fn start_cameras(&mut self) -> Result<usize, SensorError> {
        self.stop_cameras();
        self.camera_devices = self.catalog.cameras()?;

        for (id, device) in self.camera_devices.iter().enumerate() {
            let provider = match self.catalog.open_camera(device) {
                Ok(p) => p,
                Err(e) => {
                    log::warn!("Skipping camera {}: {}", device.name, e);
                    self.console
                        .output(&format!("Camera unavailable: {} ({})", device.name, e), verbosity::INFO);
                    self.listener.on_error(DeviceKind::Camera, id, &e);
                    continue;
                }
            };

            let mut session = CameraSession::new(id, provider, Arc::clone(&self.listener), self.console.clone());
            if let Err(e) = session.start() {
                log::warn!("Camera {} did not start: {}", device.name, e);
            }
            self.cameras.push(session);
        }

        let active = self.cameras.iter().filter(|s| s.state().is_active()).count();
        log::info!("{} of {} cameras active", active, self.camera_devices.len());
        Ok(active)
    }

    /// List microphones and start a session for the default one.
    ///
    /// Returns the full listing so a front end can offer a selection.
    pub fn start_microphones(&mut self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.microphone_devices = self.catalog.microphones()?;

        match default_index(&self.microphone_devices) {
            Some(index) => {
                if let Err(e) = self.open_microphone(index) {
                    log::warn!("Default microphone did not start: {}", e);
                }
            }
            None => {
                self.console
                    .output("No audio input devices found.", verbosity::INFO);
            }
        }

        Ok(self.microphone_devices.clone())
    }

    /// Replace the active microphone with the one at `index`.
    ///
    /// The device list is refreshed first. The old session is stopped and
    /// dropped before the new one opens.
    pub fn switch_microphone(&mut self, index: usize) -> Result<(), SensorError> {
        self.microphone_devices = self.catalog.microphones()?;
        if index >= self.microphone_devices.len() {
            return Err(SensorError::DeviceNotAvailable);
        }
        self.open_microphone(index)
    }

    /// Output devices. No session is built for them.
    pub fn list_speakers(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.catalog.speakers()
    }

    pub fn camera_devices(&self) -> &[DeviceInfo] {
        &self.camera_devices
    }

    pub fn microphone_devices(&self) -> &[DeviceInfo] {
        &self.microphone_devices
    }

    pub fn selected_microphone(&self) -> Option<usize> {
        self.selected_microphone
    }

    pub fn camera_state(&self, id: usize) -> Option<SessionState> {
        self.cameras.iter().find(|s| s.id() == id).map(|s| s.state())
    }

    pub fn microphone_state(&self) -> Option<SessionState> {
        self.microphone.as_ref().map(|s| s.state())
    }

    pub fn microphone_session_id(&self) -> Option<usize> {
        self.microphone.as_ref().map(|s| s.id())
    }

    pub fn camera_sessions(&self) -> &[DynCameraSession] {
        &self.cameras
    }

    pub fn microphone_session(&self) -> Option<&DynMicrophoneSession> {
        self.microphone.as_ref()
    }

    /// Feed user-typed text to the text stream, if enabled.
    pub fn text(&self, message: &str) {
        if let Some(ref stream) = self.text_stream {
            stream.get_text(message);
        }
    }

    /// Stop and drop every session.
    pub fn stop_all(&mut self) {
        self.stop_cameras();
        self.close_microphone();
    }

    fn stop_cameras(&mut self) {
        for mut session in self.cameras.drain(..) {
            if let Err(e) = session.stop() {
                log::warn!("Failed to stop camera {}: {}", session.device().name, e);
            }
        }
    }

    fn close_microphone(&mut self) {
        if let Some(mut session) = self.microphone.take() {
            if let Err(e) = session.stop() {
                log::warn!("Failed to stop microphone {}: {}", session.device().name, e);
            }
        }
        self.selected_microphone = None;
    }

    fn open_microphone(&mut self, index: usize) -> Result<(), SensorError> {
        self.close_microphone();

        let device = &self.microphone_devices[index];
        let provider = self.catalog.open_microphone(device)?;

        let id = self.next_microphone_id;
        self.next_microphone_id += 1;

        let mut session = MicrophoneSession::new(
            id,
            provider,
            self.config.microphone_format.clone(),
            Arc::clone(&self.listener),
            self.console.clone(),
        );
        let started = session.start();

        self.microphone = Some(session);
        self.selected_microphone = Some(index);
        started
    }
}

impl<C: DeviceCatalog> Drop for SensorHub<C> {
    fn drop(&mut self) {
        self.stop_all();
    }
}
