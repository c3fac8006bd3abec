/// Class of a capture or playback device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Camera,
    Microphone,
    Speaker,
}

/// A device reported by a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub is_default: bool,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DeviceKind, is_default: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            is_default,
        }
    }
}

/// Index of the default device in `devices`, falling back to the first one.
pub fn default_index(devices: &[DeviceInfo]) -> Option<usize> {
    devices
        .iter()
        .position(|d| d.is_default)
        .or(if devices.is_empty() { None } else { Some(0) })
}
