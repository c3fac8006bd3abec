use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use singular_core::{
    CameraProvider, DeviceInfo, FrameDelivery, PixelFormat, SensorError, VideoFormat, VideoFrame,
    VideoFrameCallback,
};

/// Settings for one simulated camera.
#[derive(Debug, Clone)]
pub struct PatternSettings {
    /// Formats offered, preferred first.
    pub formats: Vec<VideoFormat>,
    pub frame_interval: Duration,
    /// Deliver one frame of the wrong size after this many frames.
    pub glitch_after: Option<u64>,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            formats: vec![
                VideoFormat::new(PixelFormat::Yuyv, 640, 480),
                VideoFormat::new(PixelFormat::Rgb32, 320, 240),
            ],
            frame_interval: Duration::from_millis(100),
            glitch_after: None,
        }
    }
}

/// Simulated camera streaming a scrolling gradient.
pub struct PatternCamera {
    info: DeviceInfo,
    settings: PatternSettings,
    running: Arc<AtomicBool>,
    stream_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl PatternCamera {
    pub fn new(info: DeviceInfo, settings: PatternSettings) -> Self {
        Self {
            info,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            stream_handle: Mutex::new(None),
        }
    }

    /// Whether the streaming thread is still delivering frames.
    pub fn is_streaming(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl CameraProvider for PatternCamera {
    fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }

    fn supported_formats(&self) -> Vec<VideoFormat> {
        self.settings.formats.clone()
    }

    fn start(&mut self, format: VideoFormat, callback: VideoFrameCallback) -> Result<(), SensorError> {
        if self.stream_handle.lock().is_some() {
            return Err(SensorError::ConfigurationFailed(
                "pattern stream already running".into(),
            ));
        }
        if !self.settings.formats.contains(&format) {
            return Err(SensorError::UnsupportedFormat(format.to_string()));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let interval = self.settings.frame_interval;
        let glitch_after = self.settings.glitch_after;

        let handle = thread::Builder::new()
            .name(format!("pattern-camera-{}", self.info.id))
            .spawn(move || {
                stream_loop(&running, format, interval, glitch_after, callback);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| SensorError::Unknown(format!("failed to spawn camera thread: {}", e)))?;

        *self.stream_handle.lock() = Some(handle);
        log::debug!("Pattern camera {} streaming {}", self.info.name, format);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_handle.lock().take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        Ok(())
    }
}

impl Drop for PatternCamera {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn stream_loop(
    running: &AtomicBool,
    format: VideoFormat,
    interval: Duration,
    glitch_after: Option<u64>,
    callback: VideoFrameCallback,
) {
    let mut sequence = 0u64;
    while running.load(Ordering::SeqCst) {
        let frame = if glitch_after == Some(sequence) {
            let wrong = VideoFormat::new(format.pixel_format, format.width / 2 + 1, format.height / 2 + 1);
            render_frame(wrong, sequence)
        } else {
            render_frame(format, sequence)
        };
        if callback(&frame) == FrameDelivery::Halt {
            log::debug!("Pattern stream halted after {} frames", sequence + 1);
            break;
        }
        sequence += 1;
        thread::sleep(interval);
    }
}

/// Render frame number `sequence` of a diagonal gradient in `format`.
///
/// Planar and compressed formats get a flat buffer of plausible size.
pub fn render_frame(format: VideoFormat, sequence: u64) -> VideoFrame {
    let (width, height) = (format.width as usize, format.height as usize);
    let shift = (sequence * 4) as usize;

    let (bytes_per_line, data) = match format.pixel_format.bytes_per_pixel() {
        Some(bpp) => {
            let stride = width * bpp;
            let mut data = Vec::with_capacity(stride * height);
            for y in 0..height {
                for x in 0..width {
                    let shade = ((x + y + shift) % 256) as u8;
                    data.extend(std::iter::repeat(shade).take(bpp));
                }
            }
            (stride, data)
        }
        None => (width, vec![(shift % 256) as u8; width * height * 3 / 2]),
    };

    VideoFrame {
        pixel_format: format.pixel_format,
        width: format.width,
        height: format.height,
        bytes_per_line,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use singular_core::DeviceKind;
    use std::sync::atomic::AtomicUsize;

    fn camera(settings: PatternSettings) -> PatternCamera {
        PatternCamera::new(DeviceInfo::new("pattern-0", "Pattern", DeviceKind::Camera, true), settings)
    }

    fn fast() -> PatternSettings {
        PatternSettings {
            frame_interval: Duration::from_millis(1),
            ..PatternSettings::default()
        }
    }

    #[test]
    fn packed_frames_have_full_stride() {
        let frame = render_frame(VideoFormat::new(PixelFormat::Rgb24, 4, 3), 0);
        assert_eq!(frame.bytes_per_line, 12);
        assert_eq!(frame.data.len(), 36);
        assert!(frame.is_valid());
    }

    #[test]
    fn planar_frames_are_flat() {
        let frame = render_frame(VideoFormat::new(PixelFormat::Nv12, 4, 2), 1);
        assert_eq!(frame.data.len(), 12);
        assert_eq!(frame.format(), VideoFormat::new(PixelFormat::Nv12, 4, 2));
    }

    #[test]
    fn halt_ends_the_stream() {
        let mut camera = camera(fast());
        let delivered = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&delivered);
        let format = camera.supported_formats()[1];

        camera
            .start(
                format,
                Arc::new(move |_: &VideoFrame| {
                    if count.fetch_add(1, Ordering::SeqCst) == 2 {
                        FrameDelivery::Halt
                    } else {
                        FrameDelivery::Continue
                    }
                }),
            )
            .unwrap();

        while camera.is_streaming() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(delivered.load(Ordering::SeqCst), 3);
        camera.stop().unwrap();
    }

    #[test]
    fn glitch_frame_has_wrong_size() {
        let mut camera = camera(PatternSettings {
            glitch_after: Some(1),
            ..fast()
        });
        let format = camera.supported_formats()[1];
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&sizes);

        camera
            .start(
                format,
                Arc::new(move |frame: &VideoFrame| {
                    let mut seen = seen.lock();
                    seen.push(frame.format());
                    if seen.len() == 3 {
                        FrameDelivery::Halt
                    } else {
                        FrameDelivery::Continue
                    }
                }),
            )
            .unwrap();

        while camera.is_streaming() {
            thread::sleep(Duration::from_millis(1));
        }
        camera.stop().unwrap();

        let sizes = sizes.lock();
        assert_eq!(sizes[0], format);
        assert_eq!(sizes[1], VideoFormat::new(PixelFormat::Rgb32, 161, 121));
        assert_eq!(sizes[2], format);
    }

    #[test]
    fn rejects_unknown_format() {
        let mut camera = camera(fast());
        let result = camera.start(
            VideoFormat::new(PixelFormat::Jpeg, 10, 10),
            Arc::new(|_: &VideoFrame| FrameDelivery::Continue),
        );
        assert!(matches!(result, Err(SensorError::UnsupportedFormat(_))));
    }
}
