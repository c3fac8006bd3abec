pub mod audio_format;
pub mod config;
pub mod device;
pub mod error;
pub mod state;
pub mod video_format;
