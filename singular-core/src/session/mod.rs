pub mod camera;
pub mod hub;
pub mod microphone;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::console::{verbosity, Console};
use crate::models::device::DeviceKind;
use crate::models::error::SensorError;
use crate::models::state::SessionState;
use crate::traits::sensor_listener::SensorListener;

/// State shared between a session and its capture callback.
pub(crate) struct SessionShared {
    pub kind: DeviceKind,
    pub id: usize,
    pub state: Mutex<SessionState>,
    pub listener: Arc<dyn SensorListener>,
    pub console: Console,
}

impl SessionShared {
    pub fn new(kind: DeviceKind, id: usize, listener: Arc<dyn SensorListener>, console: Console) -> Arc<Self> {
        Arc::new(Self {
            kind,
            id,
            state: Mutex::new(SessionState::Uninitialized),
            listener,
            console,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Store `new_state` and notify the listener.
    pub fn set_state(&self, new_state: SessionState) {
        *self.state.lock() = new_state.clone();
        self.console.output(
            &format!("{} device state: {}", self.label(), new_state.name()),
            verbosity::TRACE,
        );
        self.listener.on_state_changed(self.kind, self.id, &new_state);
    }

    /// Move to `Stopped(error)` unless already stopped, and report the error.
    ///
    /// Returns false if the session had already stopped.
    pub fn fail(&self, error: SensorError) -> bool {
        {
            let mut state = self.state.lock();
            if state.is_stopped() {
                return false;
            }
            *state = SessionState::Stopped(Some(error.clone()));
        }
        self.console.output(
            &format!("{} device state: StoppedState ({})", self.label(), error),
            verbosity::TRACE,
        );
        self.listener
            .on_state_changed(self.kind, self.id, &SessionState::Stopped(Some(error.clone())));
        self.listener.on_error(self.kind, self.id, &error);
        true
    }

    fn label(&self) -> &'static str {
        match self.kind {
            DeviceKind::Camera => "Camera",
            DeviceKind::Microphone => "Audio-in",
            DeviceKind::Speaker => "Audio-out",
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Mock devices that deliver buffers only when a test pushes them.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::audio_format::AudioFormat;
    use crate::models::device::DeviceInfo;
    use crate::models::video_format::{Bitmap, VideoFormat, VideoFrame};
    use crate::traits::audio_provider::{AudioBufferCallback, AudioInputProvider, CaptureFailureCallback};
    use crate::traits::camera_provider::{CameraProvider, FrameDelivery, VideoFrameCallback};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        State(DeviceKind, usize, SessionState),
        Level(usize, u8),
        Frame(usize, Bitmap),
        Error(DeviceKind, usize, SensorError),
    }

    #[derive(Default)]
    pub struct RecordingListener {
        pub events: Mutex<Vec<Event>>,
    }

    impl RecordingListener {
        pub fn levels(&self) -> Vec<(usize, u8)> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    Event::Level(id, level) => Some((*id, *level)),
                    _ => None,
                })
                .collect()
        }

        pub fn frames(&self) -> Vec<(usize, Bitmap)> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    Event::Frame(id, frame) => Some((*id, frame.clone())),
                    _ => None,
                })
                .collect()
        }

        pub fn errors(&self) -> Vec<SensorError> {
            self.events
                .lock()
                .iter()
                .filter_map(|e| match e {
                    Event::Error(_, _, error) => Some(error.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl SensorListener for RecordingListener {
        fn on_state_changed(&self, kind: DeviceKind, session_id: usize, state: &SessionState) {
            self.events.lock().push(Event::State(kind, session_id, state.clone()));
        }

        fn on_microphone_level(&self, session_id: usize, level: u8) {
            self.events.lock().push(Event::Level(session_id, level));
        }

        fn on_camera_frame(&self, session_id: usize, frame: &Bitmap) {
            self.events.lock().push(Event::Frame(session_id, frame.clone()));
        }

        fn on_error(&self, kind: DeviceKind, session_id: usize, error: &SensorError) {
            self.events.lock().push(Event::Error(kind, session_id, error.clone()));
        }
    }

    /// Handles a test keeps to drive a mock microphone after handing it over.
    #[derive(Clone, Default)]
    pub struct MicHandle {
        pub callback: Arc<Mutex<Option<AudioBufferCallback>>>,
        pub on_failure: Arc<Mutex<Option<CaptureFailureCallback>>>,
        pub started_with: Arc<Mutex<Option<AudioFormat>>>,
        pub stops: Arc<AtomicUsize>,
    }

    impl MicHandle {
        pub fn push(&self, data: &[u8]) {
            let callback = self.callback.lock().clone();
            if let Some(callback) = callback {
                callback(data);
            }
        }

        /// Kill capture the way a backend thread would after a device error.
        pub fn fail(&self, error: SensorError) {
            self.callback.lock().take();
            let on_failure = self.on_failure.lock().take();
            if let Some(on_failure) = on_failure {
                on_failure(error);
            }
        }

        pub fn stop_count(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    pub struct MockMic {
        pub info: DeviceInfo,
        pub preferred: AudioFormat,
        pub supported: Vec<AudioFormat>,
        pub fail_start: bool,
        pub handle: MicHandle,
    }

    impl MockMic {
        pub fn new(info: DeviceInfo, preferred: AudioFormat) -> Self {
            Self {
                info,
                supported: vec![preferred.clone()],
                preferred,
                fail_start: false,
                handle: MicHandle::default(),
            }
        }
    }

    impl AudioInputProvider for MockMic {
        fn device_info(&self) -> DeviceInfo {
            self.info.clone()
        }

        fn preferred_format(&self) -> AudioFormat {
            self.preferred.clone()
        }

        fn is_format_supported(&self, format: &AudioFormat) -> bool {
            self.supported.contains(format)
        }

        fn nearest_format(&self, _format: &AudioFormat) -> AudioFormat {
            self.supported[0].clone()
        }

        fn start(
            &mut self,
            format: &AudioFormat,
            callback: AudioBufferCallback,
            on_failure: CaptureFailureCallback,
        ) -> Result<(), SensorError> {
            if self.fail_start {
                return Err(SensorError::DeviceNotAvailable);
            }
            *self.handle.started_with.lock() = Some(format.clone());
            *self.handle.callback.lock() = Some(callback);
            *self.handle.on_failure.lock() = Some(on_failure);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), SensorError> {
            self.handle.callback.lock().take();
            self.handle.on_failure.lock().take();
            self.handle.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    pub struct CameraHandle {
        pub callback: Arc<Mutex<Option<VideoFrameCallback>>>,
        pub started_with: Arc<Mutex<Option<VideoFormat>>>,
        pub halted: Arc<Mutex<bool>>,
        pub stops: Arc<AtomicUsize>,
    }

    impl CameraHandle {
        /// Deliver `frame` the way a backend would, honoring `Halt`.
        pub fn push(&self, frame: &VideoFrame) -> Option<FrameDelivery> {
            if *self.halted.lock() {
                return None;
            }
            let callback = self.callback.lock().clone()?;
            let delivery = callback(frame);
            if delivery == FrameDelivery::Halt {
                *self.halted.lock() = true;
            }
            Some(delivery)
        }

        pub fn stop_count(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }
    }

    pub struct MockCamera {
        pub info: DeviceInfo,
        pub formats: Vec<VideoFormat>,
        pub handle: CameraHandle,
    }

    impl MockCamera {
        pub fn new(info: DeviceInfo, formats: Vec<VideoFormat>) -> Self {
            Self {
                info,
                formats,
                handle: CameraHandle::default(),
            }
        }
    }

    impl CameraProvider for MockCamera {
        fn device_info(&self) -> DeviceInfo {
            self.info.clone()
        }

        fn supported_formats(&self) -> Vec<VideoFormat> {
            self.formats.clone()
        }

        fn start(&mut self, format: VideoFormat, callback: VideoFrameCallback) -> Result<(), SensorError> {
            *self.handle.started_with.lock() = Some(format);
            *self.handle.callback.lock() = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), SensorError> {
            self.handle.callback.lock().take();
            self.handle.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    pub fn frame(format: VideoFormat) -> VideoFrame {
        let bpp = format.pixel_format.bytes_per_pixel().unwrap_or(1);
        let len = format.width as usize * format.height as usize * bpp;
        VideoFrame {
            pixel_format: format.pixel_format,
            width: format.width,
            height: format.height,
            bytes_per_line: format.width as usize * bpp,
            data: (0..len).map(|i| (i % 251) as u8).collect(),
        }
    }
}
