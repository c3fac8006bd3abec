//! # singular-core
//!
//! Platform-agnostic core for the Singular sensor viewer.
//!
//! Provides microphone level metering, camera frame gating, device session
//! orchestration, a verbosity-filtered console, and window-state settings.
//! Platform backends implement `DeviceCatalog`, `AudioInputProvider`, and
//! `CameraProvider` and plug into the generic `SensorHub`.
//!
//! ## Architecture
//!
//! ```text
//! singular-core (this crate)
//! ├── traits/       ← AudioInputProvider, CameraProvider, DeviceCatalog, SensorListener
//! ├── models/       ← SensorError, SessionState, SensorConfiguration, AudioFormat, VideoFormat, ...
//! ├── processing/   ← LevelMeter, FrameGate, widget painters
//! ├── session/      ← MicrophoneSession, CameraSession, SensorHub
//! ├── console/      ← Console, TextStream
//! └── storage/      ← SettingsStore, WindowState
//! ```

pub mod console;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use console::text_stream::TextStream;
pub use console::Console;
pub use models::audio_format::{AudioFormat, ByteOrder, SampleType};
pub use models::config::SensorConfiguration;
pub use models::device::{DeviceInfo, DeviceKind};
pub use models::error::SensorError;
pub use models::state::SessionState;
pub use models::video_format::{Bitmap, HandleType, ImageFormat, PixelFormat, VideoFormat, VideoFrame};
pub use processing::frame_gate::FrameGate;
pub use processing::level_meter::LevelMeter;
pub use processing::painter::{CameraWidget, MeterWidget, Rect, Viewport};
pub use session::camera::CameraSession;
pub use session::hub::SensorHub;
pub use session::microphone::MicrophoneSession;
pub use storage::settings::SettingsStore;
pub use storage::window_state::WindowState;
pub use traits::audio_provider::{AudioBufferCallback, AudioInputProvider, CaptureFailureCallback};
pub use traits::camera_provider::{CameraProvider, FrameDelivery, VideoFrameCallback};
pub use traits::device_catalog::DeviceCatalog;
pub use traits::sensor_listener::{NullListener, SensorListener};
