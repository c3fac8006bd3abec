use crate::models::device::DeviceKind;
use crate::models::error::SensorError;
use crate::models::state::SessionState;
use crate::models::video_format::Bitmap;

/// Event sink for sensor sessions.
///
/// Methods may be called from a backend's capture thread, not the UI
/// thread. Implementations should hand events to their own event loop.
pub trait SensorListener: Send + Sync {
    /// A session moved to a new state.
    fn on_state_changed(&self, kind: DeviceKind, session_id: usize, state: &SessionState);

    /// A microphone buffer was metered; `level` is in `0..=100`.
    fn on_microphone_level(&self, session_id: usize, level: u8);

    /// A camera frame passed the frame gate.
    fn on_camera_frame(&self, session_id: usize, frame: &Bitmap);

    /// A session failed.
    fn on_error(&self, kind: DeviceKind, session_id: usize, error: &SensorError);

    /// A formatted console line.
    fn on_console(&self, _line: &str) {}
}

/// Listener that ignores every event.
pub struct NullListener;

impl SensorListener for NullListener {
    fn on_state_changed(&self, _kind: DeviceKind, _session_id: usize, _state: &SessionState) {}
    fn on_microphone_level(&self, _session_id: usize, _level: u8) {}
    fn on_camera_frame(&self, _session_id: usize, _frame: &Bitmap) {}
    fn on_error(&self, _kind: DeviceKind, _session_id: usize, _error: &SensorError) {}
}
