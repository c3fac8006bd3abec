use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::models::error::SensorError;

/// Key/string settings persisted as a flat JSON object.
///
/// Keys are grouped by prefix, e.g. `Window/WindowWidth`. Values are
/// opaque strings; typed access parses on read.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl SettingsStore {
    /// Load settings from `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SensorError> {
        let path = path.into();
        let values = if path.exists() {
            let json = fs::read_to_string(&path)
                .map_err(|e| SensorError::StorageError(format!("failed to read settings: {}", e)))?;
            serde_json::from_str(&json)
                .map_err(|e| SensorError::StorageError(format!("failed to parse settings: {}", e)))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse the value under `key`, falling back to `default` when the key
    /// is missing or does not parse.
    pub fn read_or<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.read(key).map(str::parse) {
            Some(Ok(value)) => value,
            Some(Err(_)) => {
                log::warn!("Ignoring malformed setting {}", key);
                default
            }
            None => default,
        }
    }

    pub fn write(&mut self, key: &str, value: impl ToString) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Write every setting to disk, creating the parent directory if needed.
    pub fn save(&self) -> Result<(), SensorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| SensorError::StorageError(format!("failed to create directory: {}", e)))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| SensorError::StorageError(format!("failed to serialize settings: {}", e)))?;
        fs::write(&self.path, json)
            .map_err(|e| SensorError::StorageError(format!("failed to write settings: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    pub(crate) fn temp_settings_path() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("singular-test-{}-{}", std::process::id(), n))
            .join("settings.json")
    }

    #[test]
    fn missing_file_is_empty() {
        let store = SettingsStore::load(temp_settings_path()).unwrap();
        assert_eq!(store.read("Window/WindowWidth"), None);
        assert_eq!(store.read_or("Window/WindowWidth", 800), 800);
    }

    #[test]
    fn save_and_reload() {
        let path = temp_settings_path();
        let mut store = SettingsStore::load(&path).unwrap();
        store.write("Window/WindowWidth", 1024);
        store.write("Window/WindowMaximized", true);
        store.save().unwrap();

        let reloaded = SettingsStore::load(&path).unwrap();
        assert_eq!(reloaded.read_or("Window/WindowWidth", 0), 1024);
        assert!(reloaded.read_or("Window/WindowMaximized", false));

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn malformed_value_falls_back() {
        let mut store = SettingsStore::load(temp_settings_path()).unwrap();
        store.write("Window/WindowHeight", "tall");
        assert_eq!(store.read_or("Window/WindowHeight", 600), 600);
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let path = temp_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let err = SettingsStore::load(&path).unwrap_err();
        assert!(matches!(err, SensorError::StorageError(_)));

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
