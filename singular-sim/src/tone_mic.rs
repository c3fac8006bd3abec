use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use singular_core::{
    AudioBufferCallback, AudioFormat, AudioInputProvider, ByteOrder, CaptureFailureCallback,
    DeviceInfo, SampleType, SensorError,
};

use crate::signal::ToneGenerator;

/// Settings for one simulated microphone.
#[derive(Debug, Clone)]
pub struct ToneSettings {
    /// Format reported as preferred by the device.
    pub preferred: AudioFormat,
    /// Tone frequency in Hz.
    pub frequency: f32,
    /// Seconds for the loudness envelope to rise from silence to full scale.
    pub sweep_secs: f32,
    /// Spacing between delivered buffers.
    pub buffer_interval: Duration,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            preferred: AudioFormat::new(44100, 16, SampleType::SignedInt, ByteOrder::LittleEndian, 2),
            frequency: 440.0,
            sweep_secs: 2.0,
            buffer_interval: Duration::from_millis(20),
        }
    }
}

/// Simulated microphone producing a swelling sine tone.
///
/// Accepts 8-bit and 16-bit integer PCM in either signedness and byte
/// order, mono or stereo, at the preferred sample rate. The preferred
/// format itself is always accepted.
pub struct ToneMicrophone {
    info: DeviceInfo,
    settings: ToneSettings,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ToneMicrophone {
    pub fn new(info: DeviceInfo, settings: ToneSettings) -> Self {
        Self {
            info,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn accepts(&self, format: &AudioFormat) -> bool {
        if *format == self.settings.preferred {
            return true;
        }
        format.codec == self.settings.preferred.codec
            && format.sample_rate == self.settings.preferred.sample_rate
            && matches!(format.sample_size, 8 | 16)
            && matches!(format.sample_type, SampleType::SignedInt | SampleType::UnsignedInt)
            && matches!(format.channel_count, 1 | 2)
    }
}

impl AudioInputProvider for ToneMicrophone {
    fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }

    fn preferred_format(&self) -> AudioFormat {
        self.settings.preferred.clone()
    }

    fn is_format_supported(&self, format: &AudioFormat) -> bool {
        self.accepts(format)
    }

    fn nearest_format(&self, format: &AudioFormat) -> AudioFormat {
        if self.accepts(format) {
            return format.clone();
        }
        let sample_type = match format.sample_type {
            SampleType::UnsignedInt => SampleType::UnsignedInt,
            _ => SampleType::SignedInt,
        };
        let nearest = AudioFormat::new(
            self.settings.preferred.sample_rate,
            if format.sample_size <= 8 { 8 } else { 16 },
            sample_type,
            format.byte_order,
            format.channel_count.clamp(1, 2),
        );
        if self.accepts(&nearest) {
            nearest
        } else {
            self.settings.preferred.clone()
        }
    }

    /// A generated tone cannot fail once running, so `_on_failure` never fires.
    fn start(
        &mut self,
        format: &AudioFormat,
        callback: AudioBufferCallback,
        _on_failure: CaptureFailureCallback,
    ) -> Result<(), SensorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(SensorError::ConfigurationFailed(
                "tone capture already running".into(),
            ));
        }
        if !self.accepts(format) {
            return Err(SensorError::UnsupportedFormat(format!(
                "{} Hz {}-bit {:?} x{}",
                format.sample_rate, format.sample_size, format.sample_type, format.channel_count
            )));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let format = format.clone();
        let settings = self.settings.clone();

        let handle = thread::Builder::new()
            .name(format!("tone-mic-{}", self.info.id))
            .spawn(move || {
                tone_loop(&running, &format, &settings, callback);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| SensorError::Unknown(format!("failed to spawn tone thread: {}", e)))?;

        *self.capture_handle.lock() = Some(handle);
        log::debug!("Tone microphone {} started", self.info.name);
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

impl Drop for ToneMicrophone {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn tone_loop(running: &AtomicBool, format: &AudioFormat, settings: &ToneSettings, callback: AudioBufferCallback) {
    let mut tone = ToneGenerator::new(settings.frequency, format.sample_rate, settings.sweep_secs);
    let frames = ((format.sample_rate as u128 * settings.buffer_interval.as_millis()) / 1000).max(1) as usize;

    while running.load(Ordering::SeqCst) {
        let buffer = tone.render(frames, format);
        callback(&buffer);
        thread::sleep(settings.buffer_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use singular_core::DeviceKind;
    use std::sync::atomic::AtomicUsize;

    fn mic() -> ToneMicrophone {
        let settings = ToneSettings {
            buffer_interval: Duration::from_millis(2),
            ..ToneSettings::default()
        };
        ToneMicrophone::new(DeviceInfo::new("tone-0", "Tone", DeviceKind::Microphone, true), settings)
    }

    fn no_failure() -> CaptureFailureCallback {
        Arc::new(|e: SensorError| panic!("tone capture failed: {}", e))
    }

    #[test]
    fn accepts_integer_pcm_at_preferred_rate() {
        let mic = mic();
        assert!(mic.is_format_supported(&mic.preferred_format()));
        assert!(mic.is_format_supported(&AudioFormat::new(
            44100,
            8,
            SampleType::UnsignedInt,
            ByteOrder::LittleEndian,
            1
        )));
        assert!(!mic.is_format_supported(&AudioFormat::default()));
        assert!(!mic.is_format_supported(&AudioFormat::new(
            44100,
            32,
            SampleType::Float,
            ByteOrder::LittleEndian,
            2
        )));
    }

    #[test]
    fn nearest_format_keeps_what_it_can() {
        let mic = mic();
        let requested = AudioFormat::new(8000, 24, SampleType::Float, ByteOrder::BigEndian, 6);
        let nearest = mic.nearest_format(&requested);
        assert_eq!(nearest.sample_rate, 44100);
        assert_eq!(nearest.sample_size, 16);
        assert_eq!(nearest.sample_type, SampleType::SignedInt);
        assert_eq!(nearest.byte_order, ByteOrder::BigEndian);
        assert_eq!(nearest.channel_count, 2);
        assert!(mic.is_format_supported(&nearest));
    }

    #[test]
    fn delivers_whole_frames_until_stopped() {
        let mut mic = mic();
        let format = mic.preferred_format();
        let buffers = Arc::new(AtomicUsize::new(0));
        let misaligned = Arc::new(AtomicBool::new(false));

        let (count, bad, stride) = (Arc::clone(&buffers), Arc::clone(&misaligned), format.frame_bytes());
        mic.start(
            &format,
            Arc::new(move |data: &[u8]| {
                if data.len() % stride != 0 {
                    bad.store(true, Ordering::SeqCst);
                }
                count.fetch_add(1, Ordering::SeqCst);
            }),
            no_failure(),
        )
        .unwrap();
        assert!(mic.is_running());

        while buffers.load(Ordering::SeqCst) < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        mic.stop().unwrap();
        assert!(!mic.is_running());
        assert!(!misaligned.load(Ordering::SeqCst));

        let after = buffers.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(buffers.load(Ordering::SeqCst), after);
    }

    #[test]
    fn rejects_double_start_and_unsupported_format() {
        let mut mic = mic();
        let format = mic.preferred_format();
        let noop: AudioBufferCallback = Arc::new(|_: &[u8]| {});

        assert!(matches!(
            mic.start(&AudioFormat::default(), Arc::clone(&noop), no_failure()),
            Err(SensorError::UnsupportedFormat(_))
        ));
        mic.start(&format, Arc::clone(&noop), no_failure()).unwrap();
        assert!(matches!(
            mic.start(&format, noop, no_failure()),
            Err(SensorError::ConfigurationFailed(_))
        ));
        mic.stop().unwrap();
    }
}
