//! Endpoint enumeration via the MMDevice API.
//!
//! Lists active capture (microphone) and render (speaker) endpoints with
//! their friendly names and reads each endpoint's shared-mode mix format.

use windows::core::PCWSTR;
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::{CoCreateInstance, CoTaskMemFree, CLSCTX_ALL, STGM_READ};

use singular_core::{AudioFormat, ByteOrder, DeviceInfo, DeviceKind, SampleType, SensorError};

const WAVE_FORMAT_PCM_TAG: u16 = 1;
const WAVE_FORMAT_IEEE_FLOAT_TAG: u16 = 3;
const WAVE_FORMAT_EXTENSIBLE_TAG: u16 = 0xFFFE;

/// Endpoint enumerator. COM must be initialized on the calling thread.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    pub fn new() -> Result<Self, SensorError> {
        let enumerator: IMMDeviceEnumerator = unsafe {
            CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                .map_err(|e| SensorError::Unknown(format!("failed to create enumerator: {}", e)))?
        };
        Ok(Self { enumerator })
    }

    /// Active capture endpoints.
    pub fn list_capture_devices(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.list_devices(eCapture, DeviceKind::Microphone)
    }

    /// Active render endpoints.
    pub fn list_render_devices(&self) -> Result<Vec<DeviceInfo>, SensorError> {
        self.list_devices(eRender, DeviceKind::Speaker)
    }

    /// Look up an endpoint by its MMDevice id.
    pub fn device(&self, id: &str) -> Result<IMMDevice, SensorError> {
        let wide: Vec<u16> = id.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            self.enumerator
                .GetDevice(PCWSTR(wide.as_ptr()))
                .map_err(|_| SensorError::DeviceNotAvailable)
        }
    }

    /// Shared-mode mix format of an endpoint.
    pub fn mix_format(&self, id: &str) -> Result<AudioFormat, SensorError> {
        let device = self.device(id)?;
        unsafe {
            let client: IAudioClient = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| SensorError::ConfigurationFailed(format!("Activate failed: {}", e)))?;
            let mix = client
                .GetMixFormat()
                .map_err(|e| SensorError::ConfigurationFailed(format!("GetMixFormat failed: {}", e)))?;
            let format = audio_format_from_wave(&*mix);
            CoTaskMemFree(Some(mix as *const _));
            Ok(format)
        }
    }

    fn list_devices(&self, flow: EDataFlow, kind: DeviceKind) -> Result<Vec<DeviceInfo>, SensorError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(flow, DEVICE_STATE_ACTIVE)
                .map_err(|e| SensorError::Unknown(format!("EnumAudioEndpoints failed: {}", e)))?;

            let count = collection
                .GetCount()
                .map_err(|e| SensorError::Unknown(format!("GetCount failed: {}", e)))?;

            let default_id = self
                .enumerator
                .GetDefaultAudioEndpoint(flow, eConsole)
                .ok()
                .and_then(|d| d.GetId().ok())
                .and_then(|id| id.to_string().ok());

            let mut devices = Vec::with_capacity(count as usize);
            for i in 0..count {
                let Ok(device) = collection.Item(i) else {
                    continue;
                };
                let Some(id) = device.GetId().ok().and_then(|id| id.to_string().ok()) else {
                    continue;
                };
                let name = friendly_name(&device).unwrap_or_else(|| format!("Device {}", i));
                let is_default = default_id.as_deref() == Some(id.as_str());
                devices.push(DeviceInfo::new(id, name, kind, is_default));
            }

            log::debug!("{} active {:?} endpoints", devices.len(), kind);
            Ok(devices)
        }
    }
}

/// `PKEY_Device_FriendlyName` of an endpoint.
fn friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;
        let value = store.GetValue(&PKEY_Device_FriendlyName).ok()?;
        let name = value.to_string();
        (!name.is_empty()).then_some(name)
    }
}

/// Translate a WAVEFORMATEX header into an `AudioFormat`.
///
/// WAVE PCM is little-endian; 8-bit PCM is unsigned and wider PCM signed.
/// Extensible headers are read as integer PCM unless they carry 32-bit
/// samples, which the shared-mode engine always delivers as float.
pub(crate) fn audio_format_from_wave(wave: &WAVEFORMATEX) -> AudioFormat {
    let (tag, bits) = (wave.wFormatTag, wave.wBitsPerSample);
    let sample_type = match tag {
        WAVE_FORMAT_IEEE_FLOAT_TAG => SampleType::Float,
        WAVE_FORMAT_EXTENSIBLE_TAG if bits == 32 => SampleType::Float,
        WAVE_FORMAT_PCM_TAG | WAVE_FORMAT_EXTENSIBLE_TAG if bits == 8 => SampleType::UnsignedInt,
        WAVE_FORMAT_PCM_TAG | WAVE_FORMAT_EXTENSIBLE_TAG => SampleType::SignedInt,
        _ => SampleType::Unknown,
    };
    AudioFormat::new(wave.nSamplesPerSec, bits, sample_type, ByteOrder::LittleEndian, wave.nChannels)
}

/// Build a WAVEFORMATEX header for an integer PCM or float `AudioFormat`.
pub(crate) fn wave_from_audio_format(format: &AudioFormat) -> WAVEFORMATEX {
    let tag = match format.sample_type {
        SampleType::Float => WAVE_FORMAT_IEEE_FLOAT_TAG,
        _ => WAVE_FORMAT_PCM_TAG,
    };
    let block_align = format.frame_bytes() as u16;
    WAVEFORMATEX {
        wFormatTag: tag,
        nChannels: format.channel_count,
        nSamplesPerSec: format.sample_rate,
        nAvgBytesPerSec: format.sample_rate * block_align as u32,
        nBlockAlign: block_align,
        wBitsPerSample: format.sample_size,
        cbSize: 0,
    }
}
