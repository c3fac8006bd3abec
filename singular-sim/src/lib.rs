//! # singular-sim
//!
//! Simulated sensors for Singular: a tone-generating microphone and a
//! test-pattern camera behind a `DeviceCatalog`, usable on any platform.

pub mod catalog;
pub mod pattern_camera;
pub mod signal;
pub mod tone_mic;

pub use catalog::{SimCamera, SimMicrophone, SimulatedCatalog};
pub use pattern_camera::{PatternCamera, PatternSettings};
pub use tone_mic::{ToneMicrophone, ToneSettings};

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;
    use singular_core::{
        Bitmap, DeviceKind, NullListener, PixelFormat, SensorConfiguration, SensorError, SensorHub,
        SensorListener, SessionState, VideoFormat,
    };

    use super::*;

    #[derive(Default)]
    struct Collector {
        levels: Mutex<Vec<u8>>,
        frames: Mutex<usize>,
        errors: Mutex<Vec<SensorError>>,
    }

    impl SensorListener for Collector {
        fn on_state_changed(&self, _kind: DeviceKind, _session_id: usize, _state: &SessionState) {}

        fn on_microphone_level(&self, _session_id: usize, level: u8) {
            self.levels.lock().push(level);
        }

        fn on_camera_frame(&self, _session_id: usize, _bitmap: &Bitmap) {
            *self.frames.lock() += 1;
        }

        fn on_error(&self, _kind: DeviceKind, _session_id: usize, error: &SensorError) {
            self.errors.lock().push(error.clone());
        }
    }

    fn wait_for(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    fn fast_catalog() -> SimulatedCatalog {
        SimulatedCatalog::standard().with_intervals(Duration::from_millis(2), Duration::from_millis(2))
    }

    #[test]
    fn hub_meters_and_draws_simulated_devices() {
        let collector = Arc::new(Collector::default());
        let listener: Arc<dyn SensorListener> = collector.clone();
        let mut hub = SensorHub::new(fast_catalog(), SensorConfiguration::default(), listener).unwrap();
        hub.start().unwrap();

        wait_for(|| collector.levels.lock().len() >= 5 && *collector.frames.lock() >= 3);
        // The YUV camera has no drawable format.
        let yuv = hub.camera_state(0).and_then(|s| s.error().cloned());
        assert!(matches!(yuv, Some(SensorError::UnsupportedFormat(_))));
        assert!(hub.camera_state(1).is_some_and(|s| s.is_active()));
        hub.stop_all();

        assert!(collector.levels.lock().iter().all(|level| *level <= 100));
        assert!(*collector.frames.lock() >= 3);
    }

    #[test]
    fn size_glitch_stops_the_camera() {
        let format = VideoFormat::new(PixelFormat::Rgb32, 32, 24);
        let catalog = fast_catalog().force_camera_format(format).with_glitch_after(2);
        let collector = Arc::new(Collector::default());
        let listener: Arc<dyn SensorListener> = collector.clone();
        let config = SensorConfiguration {
            enable_microphone: false,
            ..SensorConfiguration::default()
        };
        let mut hub = SensorHub::new(catalog, config, listener).unwrap();
        hub.start().unwrap();

        wait_for(|| collector.errors.lock().len() >= 2);
        let errors = collector.errors.lock().clone();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, SensorError::FrameMismatch { .. })));
        assert_eq!(*collector.frames.lock(), 4);
        hub.stop_all();
    }

    #[test]
    fn float_microphone_reports_no_levels() {
        let collector = Arc::new(Collector::default());
        let listener: Arc<dyn SensorListener> = collector.clone();
        let config = SensorConfiguration {
            enable_cameras: false,
            ..SensorConfiguration::default()
        };
        let mut hub = SensorHub::new(fast_catalog(), config, listener).unwrap();
        hub.start().unwrap();
        hub.switch_microphone(2).unwrap();
        collector.levels.lock().clear();

        assert_eq!(hub.microphone_session_id(), Some(1));
        assert_eq!(hub.microphone_session().map(|s| s.is_metering()), Some(false));
        wait_for(|| hub.microphone_session().map_or(0, |s| s.buffers_received()) >= 3);
        assert!(collector.levels.lock().is_empty());
        hub.stop_all();
    }

    #[test]
    fn null_listener_is_accepted() {
        let listener: Arc<dyn SensorListener> = Arc::new(NullListener);
        let mut hub = SensorHub::new(fast_catalog(), SensorConfiguration::default(), listener).unwrap();
        hub.start().unwrap();
        hub.stop_all();
    }
}
