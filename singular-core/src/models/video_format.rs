use std::fmt;

/// Pixel layout of frames delivered by a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Argb32,
    Argb32Premultiplied,
    Rgb32,
    Rgb24,
    Rgb565,
    Rgb555,
    Bgra32,
    Bgr24,
    Yuyv,
    Uyvy,
    Nv12,
    Yuv420p,
    Jpeg,
}

/// Bitmap layouts the paint path can draw directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Argb32,
    Argb32Premultiplied,
    Rgb32,
    Rgb888,
    Rgb16,
    Rgb555,
}

/// How frame memory is handed over by the capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleType {
    /// Plain mapped memory.
    NoHandle,
    /// GPU texture; never drawn by the bitmap path.
    GlTexture,
}

impl PixelFormat {
    /// Bitmap equivalent of this pixel format, if one exists.
    pub fn image_format(self) -> Option<ImageFormat> {
        match self {
            Self::Argb32 => Some(ImageFormat::Argb32),
            Self::Argb32Premultiplied => Some(ImageFormat::Argb32Premultiplied),
            Self::Rgb32 => Some(ImageFormat::Rgb32),
            Self::Rgb24 => Some(ImageFormat::Rgb888),
            Self::Rgb565 => Some(ImageFormat::Rgb16),
            Self::Rgb555 => Some(ImageFormat::Rgb555),
            _ => None,
        }
    }

    /// Bytes per pixel for packed formats, `None` for planar or compressed ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Argb32 | Self::Argb32Premultiplied | Self::Rgb32 | Self::Bgra32 => Some(4),
            Self::Rgb24 | Self::Bgr24 => Some(3),
            Self::Rgb565 | Self::Rgb555 | Self::Yuyv | Self::Uyvy => Some(2),
            Self::Nv12 | Self::Yuv420p | Self::Jpeg => None,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Negotiated description of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoFormat {
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub handle_type: HandleType,
}

impl VideoFormat {
    pub fn new(pixel_format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            pixel_format,
            width,
            height,
            handle_type: HandleType::NoHandle,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.pixel_format, self.width, self.height)
    }
}

/// One frame as delivered by a camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub pixel_format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub bytes_per_line: usize,
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// A frame is valid when it carries pixel data and a non-empty size.
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }

    /// Format descriptor of this frame (always mapped memory).
    pub fn format(&self) -> VideoFormat {
        VideoFormat::new(self.pixel_format, self.width, self.height)
    }
}

/// A frame accepted for display, in a layout the paint path draws directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes_per_line: usize,
    pub data: Vec<u8>,
}
