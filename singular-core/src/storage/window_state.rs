use std::collections::BTreeMap;

use crate::processing::painter::Viewport;

use super::settings::SettingsStore;

pub const KEY_WIDTH: &str = "Window/WindowWidth";
pub const KEY_HEIGHT: &str = "Window/WindowHeight";
pub const KEY_POSITION: &str = "Window/WindowPosition";
pub const KEY_MAXIMIZED: &str = "Window/WindowMaximized";

/// Splitters whose layout is saved with the window.
pub const SPLITTERS: [&str; 4] = ["Splitter", "SplitterSensors", "SplitterOutput", "SplitterOptions"];

pub const DEFAULT_WIDTH: i32 = 800;
pub const DEFAULT_HEIGHT: i32 = 600;

/// Main window geometry and layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub width: i32,
    pub height: i32,
    pub position: (i32, i32),
    pub maximized: bool,
    /// Opaque splitter layouts keyed by splitter name.
    pub splitters: BTreeMap<String, String>,
}

impl WindowState {
    /// Restore the window from `store`.
    ///
    /// Missing values fall back to 800x600, centered on `screen`.
    pub fn load(store: &SettingsStore, screen: Viewport) -> Self {
        let width = positive_or(store.read_or(KEY_WIDTH, DEFAULT_WIDTH), DEFAULT_WIDTH);
        let height = positive_or(store.read_or(KEY_HEIGHT, DEFAULT_HEIGHT), DEFAULT_HEIGHT);
        let centered = (
            screen.width.saturating_sub(width) / 2,
            screen.height.saturating_sub(height) / 2,
        );
        let position = store
            .read(KEY_POSITION)
            .and_then(parse_point)
            .unwrap_or(centered);

        let splitters = SPLITTERS
            .iter()
            .filter_map(|name| {
                store
                    .read(&splitter_key(name))
                    .map(|state| (name.to_string(), state.to_string()))
            })
            .collect();

        Self {
            width,
            height,
            position,
            maximized: store.read_or(KEY_MAXIMIZED, false),
            splitters,
        }
    }

    /// Store the window into `store`.
    ///
    /// Size and position are only written while not maximized, so the
    /// last normal geometry survives a maximized session.
    pub fn save(&self, store: &mut SettingsStore) {
        if !self.maximized {
            store.write(KEY_WIDTH, self.width);
            store.write(KEY_HEIGHT, self.height);
            store.write(KEY_POSITION, format!("{},{}", self.position.0, self.position.1));
        }
        store.write(KEY_MAXIMIZED, self.maximized);

        for (name, state) in &self.splitters {
            store.write(&splitter_key(name), state);
        }
    }
}

fn positive_or(value: i32, default: i32) -> i32 {
    if value > 0 {
        value
    } else {
        default
    }
}

fn splitter_key(name: &str) -> String {
    format!("Window/{}", name)
}

fn parse_point(value: &str) -> Option<(i32, i32)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
