//! # singular-windows
//!
//! Windows backend for Singular.
//!
//! Provides:
//! - `WasapiMicrophone`: shared-mode capture of raw PCM bytes
//! - `DeviceEnumerator`: capture and render endpoint listing via MMDevice
//! - `WindowsCatalog`: the `DeviceCatalog` tying them together
//!
//! Everything is compiled only on Windows; on other targets the crate is
//! empty.

#[cfg(target_os = "windows")]
pub mod catalog;
#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod wasapi_mic;

#[cfg(target_os = "windows")]
pub use catalog::WindowsCatalog;
#[cfg(target_os = "windows")]
pub use device_enumerator::DeviceEnumerator;
#[cfg(target_os = "windows")]
pub use wasapi_mic::WasapiMicrophone;
