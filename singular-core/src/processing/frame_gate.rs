use crate::models::error::SensorError;
use crate::models::video_format::{Bitmap, HandleType, PixelFormat, VideoFormat, VideoFrame};

/// Pixel formats with a direct bitmap equivalent, in preference order.
pub const BITMAP_PIXEL_FORMATS: [PixelFormat; 6] = [
    PixelFormat::Argb32,
    PixelFormat::Argb32Premultiplied,
    PixelFormat::Rgb32,
    PixelFormat::Rgb24,
    PixelFormat::Rgb565,
    PixelFormat::Rgb555,
];

/// Gate between a camera stream and the bitmap paint path.
///
/// A stream is negotiated once with `start()`. Every frame presented after
/// that must match the negotiated pixel format and size exactly. The first
/// mismatch halts the gate for good; a new stream needs a new gate.
#[derive(Debug, Default)]
pub struct FrameGate {
    negotiated: Option<VideoFormat>,
    halted: bool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel formats the gate can accept for the given handle type.
    pub fn supported_pixel_formats(handle_type: HandleType) -> Vec<PixelFormat> {
        match handle_type {
            HandleType::NoHandle => BITMAP_PIXEL_FORMATS.to_vec(),
            HandleType::GlTexture => Vec::new(),
        }
    }

    /// A format is drawable when it maps to a bitmap layout, has a non-empty
    /// size, and lives in plain memory.
    pub fn is_format_supported(format: &VideoFormat) -> bool {
        format.pixel_format.image_format().is_some()
            && !format.is_empty()
            && format.handle_type == HandleType::NoHandle
    }

    /// Negotiate the stream format.
    pub fn start(&mut self, format: VideoFormat) -> Result<(), SensorError> {
        if self.halted {
            return Err(SensorError::InvalidState("frame gate halted".into()));
        }
        if !Self::is_format_supported(&format) {
            return Err(SensorError::UnsupportedFormat(format.to_string()));
        }
        self.negotiated = Some(format);
        Ok(())
    }

    pub fn negotiated(&self) -> Option<VideoFormat> {
        self.negotiated
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Accept `frame` for display or halt the gate.
    ///
    /// On success the returned bitmap carries the frame's bytes unmodified.
    pub fn present(&mut self, frame: &VideoFrame) -> Result<Bitmap, SensorError> {
        if self.halted {
            return Err(SensorError::InvalidState("frame gate halted".into()));
        }
        let Some(expected) = self.negotiated else {
            return Err(SensorError::InvalidState("frame gate not started".into()));
        };

        let actual = frame.format();
        let image_format = expected.pixel_format.image_format();
        match image_format {
            Some(format)
                if frame.is_valid()
                    && actual.pixel_format == expected.pixel_format
                    && actual.width == expected.width
                    && actual.height == expected.height =>
            {
                Ok(Bitmap {
                    format,
                    width: frame.width,
                    height: frame.height,
                    bytes_per_line: frame.bytes_per_line,
                    data: frame.data.clone(),
                })
            }
            _ => {
                self.halted = true;
                self.negotiated = None;
                Err(SensorError::FrameMismatch { expected, actual })
            }
        }
    }
}
