use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the persisted settings inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Highest antialiasing level the engine will ever request (16x multisampling).
pub const MAX_ANTIALIASING: u8 = 4;

/// Typed, named engine settings persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    /// Multisampling level; 0 disables it, level `n` requests `2^n` samples.
    pub antialiasing: u8,
    pub fullscreen: bool,
    pub vsync: bool,
    pub audio_frequency: i32,
    pub audio_channels: u8,
    pub audio_buffer: u16,
    pub joysticks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            antialiasing: 2,
            fullscreen: true,
            vsync: true,
            audio_frequency: 44_100,
            audio_channels: 2,
            audio_buffer: 1024,
            joysticks: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unable to read settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to write settings to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("data directory {0} does not exist")]
    MissingDataDirectory(PathBuf),
    #[error("no data directory to store settings in")]
    NoDataDirectory,
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let mut settings: Settings =
            serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.clamp();
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Writes the settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved settings to {}", path.display());
        Ok(())
    }

    fn clamp(&mut self) {
        self.antialiasing = self.antialiasing.min(MAX_ANTIALIASING);
        self.width = self.width.max(1);
        self.height = self.height.max(1);
        self.audio_channels = self.audio_channels.max(1);
    }
}

/// Directories the engine reads its data and settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub binary_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl DataPaths {
    /// Uses `data_path` when given, otherwise the directory holding the binary.
    pub fn resolve(binary_path: &Path, data_path: Option<&Path>) -> Result<Self, SettingsError> {
        let binary_dir = match binary_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let data_dir = data_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| binary_dir.clone());
        if !data_dir.is_dir() {
            return Err(SettingsError::MissingDataDirectory(data_dir));
        }
        Ok(Self {
            binary_dir,
            data_dir,
        })
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "antialiasing": 3, "fullscreen": false }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.antialiasing, 3);
        assert!(!settings.fullscreen);
        assert_eq!(settings.width, 1024);
    }

    #[test]
    fn antialiasing_is_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{ "antialiasing": 200 }"#).unwrap();
        assert_eq!(Settings::load(&path).unwrap().antialiasing, MAX_ANTIALIASING);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let settings = Settings {
            antialiasing: 0,
            fullscreen: false,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn data_dir_defaults_to_binary_dir() {
        let dir = tempdir().unwrap();
        let binary = dir.path().join("game");
        let paths = DataPaths::resolve(&binary, None).unwrap();
        assert_eq!(paths.data_dir, dir.path());
        assert_eq!(paths.settings_file(), dir.path().join(SETTINGS_FILE));
    }

    #[test]
    fn missing_data_dir_is_rejected() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = DataPaths::resolve(Path::new("game"), Some(&missing)).unwrap_err();
        assert!(matches!(err, SettingsError::MissingDataDirectory(path) if path == missing));
    }
}
