//! Paint geometry for the level meter and camera widgets.
//!
//! Widgets keep only the last value they were given; painting is a pure
//! function of that value and the viewport size.

use crate::models::video_format::Bitmap;

/// Axis-aligned rectangle in widget pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Widget viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Shapes to draw for a level meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterPaint {
    /// Outline around the whole widget.
    pub border: Rect,
    /// Filled bar, absent at level 0.
    pub fill: Option<Rect>,
}

/// Volume meter: a bordered bar filled in proportion to the level.
#[derive(Debug, Clone, Default)]
pub struct MeterWidget {
    level: u8,
}

impl MeterWidget {
    pub const MIN_WIDTH: i32 = 200;
    pub const MIN_HEIGHT: i32 = 30;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn paint(&self, viewport: Viewport) -> MeterPaint {
        let border = Rect::new(0, 0, viewport.width - 1, viewport.height - 1);
        let fill = (self.level > 0).then(|| {
            Rect::new(1, 1, fill_width(self.level, viewport.width), viewport.height - 2)
        });
        MeterPaint { border, fill }
    }
}

/// Width of the filled part of a meter `width` pixels wide.
pub fn fill_width(level: u8, width: i32) -> i32 {
    ((level as i64 * width as i64 - 1) / 100).max(0) as i32
}

/// Shapes to draw for a camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePaint {
    /// Where the bitmap is drawn, scaled to fill the viewport.
    pub target: Rect,
    /// Outline at the frame's true size.
    pub border: Rect,
}

/// Camera display: holds the latest accepted frame.
#[derive(Debug, Clone, Default)]
pub struct CameraWidget {
    frame: Option<Bitmap>,
    frames_received: u64,
}

impl CameraWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_frame(&mut self, frame: Bitmap) {
        self.frame = Some(frame);
        self.frames_received += 1;
    }

    pub fn frame(&self) -> Option<&Bitmap> {
        self.frame.as_ref()
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// `None` until the first frame arrives.
    pub fn paint(&self, viewport: Viewport) -> Option<FramePaint> {
        let frame = self.frame.as_ref()?;
        Some(FramePaint {
            target: Rect::new(0, 0, viewport.width, viewport.height),
            border: Rect::new(0, 0, frame.width as i32, frame.height as i32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::video_format::ImageFormat;

    #[test]
    fn empty_meter_paints_border_only() {
        let meter = MeterWidget::new();
        let paint = meter.paint(Viewport::new(200, 30));
        assert_eq!(paint.border, Rect::new(0, 0, 199, 29));
        assert_eq!(paint.fill, None);
    }

    #[test]
    fn full_meter_fills_inside_border() {
        let mut meter = MeterWidget::new();
        meter.set_level(100);
        let paint = meter.paint(Viewport::new(200, 30));
        // (100 * 200 - 1) / 100
        assert_eq!(paint.fill, Some(Rect::new(1, 1, 199, 28)));
    }

    #[test]
    fn half_meter() {
        let mut meter = MeterWidget::new();
        meter.set_level(50);
        let paint = meter.paint(Viewport::new(200, 30));
        assert_eq!(paint.fill.map(|r| r.width), Some(99));
    }

    #[test]
    fn level_is_clamped() {
        let mut meter = MeterWidget::new();
        meter.set_level(250);
        assert_eq!(meter.level(), 100);
    }

    #[test]
    fn fill_width_never_negative() {
        assert_eq!(fill_width(1, 0), 0);
        assert_eq!(fill_width(0, 200), 0);
    }

    #[test]
    fn camera_paint_scales_to_viewport_with_true_size_border() {
        let mut camera = CameraWidget::new();
        assert!(camera.paint(Viewport::new(640, 480)).is_none());

        camera.update_frame(Bitmap {
            format: ImageFormat::Rgb32,
            width: 320,
            height: 240,
            bytes_per_line: 1280,
            data: vec![0; 1280 * 240],
        });

        let paint = camera.paint(Viewport::new(640, 480)).unwrap();
        assert_eq!(paint.target, Rect::new(0, 0, 640, 480));
        assert_eq!(paint.border, Rect::new(0, 0, 320, 240));
        assert_eq!(camera.frames_received(), 1);
    }
}
