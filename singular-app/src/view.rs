//! Text rendering of the sensor widgets.
//!
//! One terminal cell stands in for one pixel of the widget viewports.

use singular_core::{CameraWidget, DeviceInfo, MeterWidget, SessionState, Viewport};

/// Rows of the meter viewport: border, fill, border.
const METER_ROWS: i32 = 3;

/// Cells shown for a camera frame preview.
pub const PREVIEW: Viewport = Viewport::new(32, 12);

/// `[#####     ]  42%`, the fill clipped to the inside of the border.
pub fn meter_line(meter: &MeterWidget, columns: u16) -> String {
    let columns = i32::from(columns).max(3);
    let paint = meter.paint(Viewport::new(columns, METER_ROWS));
    let inner = (paint.border.width - 1).max(0);
    let filled = paint.fill.map_or(0, |fill| fill.width.min(inner));

    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled as usize),
        " ".repeat((inner - filled) as usize),
        meter.level()
    )
}

/// One-line summary of a camera widget and its session state.
pub fn camera_line(id: usize, device: &DeviceInfo, widget: &CameraWidget, state: Option<&SessionState>) -> String {
    let status = match state {
        Some(SessionState::Stopped(Some(error))) => format!("stopped: {}", error),
        Some(SessionState::Stopped(None)) => "stopped".to_string(),
        Some(SessionState::Uninitialized) | None => "not started".to_string(),
        Some(SessionState::Active) => match (widget.frame(), widget.paint(PREVIEW)) {
            (Some(frame), Some(paint)) => format!(
                "{:?} {}x{} drawn at {}x{}, {} frames",
                frame.format,
                paint.border.width,
                paint.border.height,
                paint.target.width,
                paint.target.height,
                widget.frames_received()
            ),
            _ => "waiting for frames".to_string(),
        },
    };
    format!("Camera {} ({}): {}", id, device.name, status)
}

/// Numbered device listing with the default flagged and the selection marked.
pub fn device_lines(title: &str, devices: &[DeviceInfo], selected: Option<usize>) -> Vec<String> {
    let mut lines = vec![format!("{}:", title)];
    if devices.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (index, device) in devices.iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        let default = if device.is_default { " [default]" } else { "" };
        lines.push(format!("{} {}: {}{}", marker, index, device.name, default));
    }
    lines
}
