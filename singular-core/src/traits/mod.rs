pub mod audio_provider;
pub mod camera_provider;
pub mod device_catalog;
pub mod sensor_listener;
