use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use coast_engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub(crate) const SETTINGS_ENV_VAR: &str = "COAST_GUARDIAN_SETTINGS";
const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    pub(crate) window_title: Option<String>,
    pub(crate) window_width: Option<u32>,
    pub(crate) window_height: Option<u32>,
    pub(crate) target_tps: Option<u32>,
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) start_level: Option<u32>,
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GameSettings {
    pub(crate) fn apply_to(&self, config: &mut LoopConfig) {
        if let Some(title) = &self.window_title {
            config.window_title = title.clone();
        }
        if let Some(width) = self.window_width.filter(|width| *width > 0) {
            config.window_width = width;
        }
        if let Some(height) = self.window_height.filter(|height| *height > 0) {
            config.window_height = height;
        }
        if let Some(tps) = self.target_tps.filter(|tps| *tps > 0) {
            config.target_tps = tps;
        }
        if let Some(fps) = self.max_render_fps {
            config.max_render_fps = (fps > 0).then_some(fps);
        }
    }
}

/// `COAST_GUARDIAN_SETTINGS` if set, otherwise `settings.json` in the project root.
pub(crate) fn settings_path(root: &Path) -> PathBuf {
    std::env::var_os(SETTINGS_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join(SETTINGS_FILE_NAME))
}

/// Reads the settings file. A missing file yields `Ok(None)`.
pub(crate) fn read_settings(path: &Path) -> Result<Option<GameSettings>, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_settings(path, &raw).map(Some)
}

fn parse_settings(path: &Path, raw: &str) -> Result<GameSettings, SettingsError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameSettings>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        SettingsError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

/// Settings for this run. Problems with the file are logged and fall back to defaults.
pub(crate) fn load_settings_or_default(path: &Path) -> GameSettings {
    match read_settings(path) {
        Ok(Some(settings)) => {
            info!(path = %path.display(), "settings_loaded");
            settings
        }
        Ok(None) => GameSettings::default(),
        Err(error) => {
            warn!(error = %error, "settings_invalid_using_defaults");
            GameSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = TempDir::new().expect("temp");
        let settings = read_settings(&temp.path().join("settings.json")).expect("read");
        assert!(settings.is_none());
    }

    #[test]
    fn partial_file_only_overrides_given_fields() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{ "window_width": 960, "start_level": 2, "max_render_fps": 0 }"#)
            .expect("write");

        let settings = read_settings(&path).expect("read").expect("present");
        assert_eq!(settings.start_level, Some(2));

        let mut config = LoopConfig {
            max_render_fps: Some(30),
            ..LoopConfig::default()
        };
        settings.apply_to(&mut config);
        assert_eq!(config.window_width, 960);
        assert_eq!(config.window_height, LoopConfig::default().window_height);
        assert_eq!(config.max_render_fps, None);
    }

    #[test]
    fn parse_errors_name_the_json_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{ "target_tps": "fast" }"#).expect("write");

        let error = read_settings(&path).expect_err("invalid");
        match &error {
            SettingsError::Parse { json_path, .. } => assert_eq!(json_path, "target_tps"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(error.to_string().contains("target_tps"));
    }

    #[test]
    fn unknown_keys_are_rejected_and_fall_back_to_defaults() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("settings.json");
        fs::write(&path, r#"{ "fullscreen": true }"#).expect("write");

        assert!(read_settings(&path).is_err());
        assert_eq!(load_settings_or_default(&path), GameSettings::default());
    }

    #[test]
    fn zero_sizes_are_ignored() {
        let settings = GameSettings {
            window_width: Some(0),
            target_tps: Some(0),
            ..GameSettings::default()
        };
        let mut config = LoopConfig::default();
        settings.apply_to(&mut config);
        assert_eq!(config.window_width, LoopConfig::default().window_width);
        assert_eq!(config.target_tps, LoopConfig::default().target_tps);
    }
}
