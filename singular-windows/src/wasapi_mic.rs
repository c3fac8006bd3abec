//! WASAPI microphone provider.
//!
//! Opens a capture endpoint in shared mode and asks the audio engine to
//! convert to the requested PCM layout (`AUTOCONVERTPCM`), so buffers
//! arrive as raw bytes in exactly the negotiated format.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use windows::core::PCWSTR;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::CLSCTX_ALL;
use windows::Win32::System::Threading::{AvRevertMmThreadCharacteristics, AvSetMmThreadCharacteristicsW};

use singular_core::{
    AudioBufferCallback, AudioFormat, AudioInputProvider, ByteOrder, CaptureFailureCallback,
    DeviceInfo, SampleType, SensorError,
};

use crate::com::ComScope;
use crate::device_enumerator::{wave_from_audio_format, DeviceEnumerator};

/// 100 ms in 100-nanosecond units.
const BUFFER_DURATION: i64 = 1_000_000;

const MIN_SAMPLE_RATE: u32 = 8000;
const MAX_SAMPLE_RATE: u32 = 192_000;
const MAX_CHANNELS: u16 = 8;

/// Shared-mode microphone on one capture endpoint.
///
/// Delivers buffers on a dedicated thread registered with MMCSS.
pub struct WasapiMicrophone {
    info: DeviceInfo,
    mix_format: AudioFormat,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl WasapiMicrophone {
    /// Open the endpoint described by `info`, reading its mix format.
    pub fn open(enumerator: &DeviceEnumerator, info: DeviceInfo) -> Result<Self, SensorError> {
        let mix_format = enumerator.mix_format(&info.id)?;
        log::debug!(
            "{} mix format: {} Hz, {} bit {:?}, {} channels",
            info.name,
            mix_format.sample_rate,
            mix_format.sample_size,
            mix_format.sample_type,
            mix_format.channel_count
        );
        Ok(Self {
            info,
            mix_format,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        })
    }
}

impl AudioInputProvider for WasapiMicrophone {
    fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }

    /// 16-bit PCM at the endpoint's mix rate and channel count.
    fn preferred_format(&self) -> AudioFormat {
        AudioFormat::new(
            self.mix_format.sample_rate,
            16,
            SampleType::SignedInt,
            ByteOrder::LittleEndian,
            self.mix_format.channel_count,
        )
    }

    fn is_format_supported(&self, format: &AudioFormat) -> bool {
        let layout = matches!(
            (format.sample_size, format.sample_type),
            (8, SampleType::UnsignedInt) | (16, SampleType::SignedInt) | (32, SampleType::Float)
        );
        layout
            && format.codec == "audio/pcm"
            && format.byte_order == ByteOrder::LittleEndian
            && (MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&format.sample_rate)
            && (1..=MAX_CHANNELS).contains(&format.channel_count)
    }

    fn nearest_format(&self, format: &AudioFormat) -> AudioFormat {
        let (sample_size, sample_type) = match (format.sample_size, format.sample_type) {
            (8, _) => (8, SampleType::UnsignedInt),
            (32, SampleType::Float) => (32, SampleType::Float),
            _ => (16, SampleType::SignedInt),
        };
        AudioFormat::new(
            format.sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE),
            sample_size,
            sample_type,
            ByteOrder::LittleEndian,
            format.channel_count.clamp(1, MAX_CHANNELS),
        )
    }

    fn start(
        &mut self,
        format: &AudioFormat,
        callback: AudioBufferCallback,
        on_failure: CaptureFailureCallback,
    ) -> Result<(), SensorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SensorError::ConfigurationFailed(
                "mic capture already running".into(),
            ));
        }
        if !self.is_format_supported(format) {
            return Err(SensorError::UnsupportedFormat(format!(
                "{} Hz {}-bit {:?}",
                format.sample_rate, format.sample_size, format.sample_type
            )));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let device_id = self.info.id.clone();
        let format = format.clone();

        let handle = thread::Builder::new()
            .name("wasapi-mic-capture".into())
            .spawn(move || {
                let result = capture_loop(&running, &device_id, &format, callback);
                // A stop request races with device errors; only report the ones that ended a live capture.
                let was_running = running.swap(false, Ordering::SeqCst);
                if let Err(e) = result {
                    log::error!("Mic capture error: {}", e);
                    if was_running {
                        on_failure(e);
                    }
                }
            })
            .map_err(|e| SensorError::Unknown(format!("failed to spawn mic thread: {}", e)))?;

        *self.capture_handle.lock() = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        Ok(())
    }
}

impl Drop for WasapiMicrophone {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Capture loop on the dedicated thread.
///
/// 1. Join the COM apartment and look up the endpoint
/// 2. Initialize a shared-mode client converting to `format`
/// 3. Register with MMCSS and poll for packets until stopped
fn capture_loop(
    running: &AtomicBool,
    device_id: &str,
    format: &AudioFormat,
    callback: AudioBufferCallback,
) -> Result<(), SensorError> {
    let _com = ComScope::enter();
    let device = DeviceEnumerator::new()?.device(device_id)?;
    let wave = wave_from_audio_format(format);
    let block_align = wave.nBlockAlign as usize;
    let silence_byte = if format.sample_type == SampleType::UnsignedInt { 0x80 } else { 0 };

    unsafe {
        let client: IAudioClient = device
            .Activate(CLSCTX_ALL, None)
            .map_err(|e| SensorError::ConfigurationFailed(format!("Activate failed: {}", e)))?;

        client
            .Initialize(
                AUDCLNT_SHAREMODE_SHARED,
                AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM
                    | AUDCLNT_STREAMFLAGS_SRC_DEFAULT_QUALITY
                    | AUDCLNT_STREAMFLAGS_NOPERSIST,
                BUFFER_DURATION,
                0,
                &wave,
                None,
            )
            .map_err(|e| {
                SensorError::ConfigurationFailed(format!("IAudioClient::Initialize failed: {}", e))
            })?;

        let capture: IAudioCaptureClient = client
            .GetService()
            .map_err(|e| SensorError::ConfigurationFailed(format!("GetService failed: {}", e)))?;

        let mut task_index = 0u32;
        let task_name: Vec<u16> = "Audio\0".encode_utf16().collect();
        let mmcss = AvSetMmThreadCharacteristicsW(PCWSTR(task_name.as_ptr()), &mut task_index).ok();

        client
            .Start()
            .map_err(|e| SensorError::Unknown(format!("IAudioClient::Start failed: {}", e)))?;

        let result = poll_packets(running, &capture, block_align, silence_byte, &callback);

        let _ = client.Stop();
        if let Some(handle) = mmcss {
            let _ = AvRevertMmThreadCharacteristics(handle);
        }
        result
    }
}

unsafe fn poll_packets(
    running: &AtomicBool,
    capture: &IAudioCaptureClient,
    block_align: usize,
    silence_byte: u8,
    callback: &AudioBufferCallback,
) -> Result<(), SensorError> {
    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(10));

        let mut packet = capture
            .GetNextPacketSize()
            .map_err(|e| SensorError::Unknown(format!("GetNextPacketSize failed: {}", e)))?;

        while packet > 0 {
            let mut data: *mut u8 = std::ptr::null_mut();
            let mut frames = 0u32;
            let mut flags = 0u32;
            capture
                .GetBuffer(&mut data, &mut frames, &mut flags, None, None)
                .map_err(|e| SensorError::Unknown(format!("GetBuffer failed: {}", e)))?;

            if frames > 0 && !data.is_null() {
                let len = frames as usize * block_align;
                if flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0 {
                    callback(&vec![silence_byte; len]);
                } else {
                    callback(std::slice::from_raw_parts(data, len));
                }
            }

            capture
                .ReleaseBuffer(frames)
                .map_err(|e| SensorError::Unknown(format!("ReleaseBuffer failed: {}", e)))?;
            packet = capture
                .GetNextPacketSize()
                .map_err(|e| SensorError::Unknown(format!("GetNextPacketSize failed: {}", e)))?;
        }
    }
    Ok(())
}
