use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PennyError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_user_name")]
    pub default_user: String,
}

fn default_user_name() -> String {
    crate::db::DEFAULT_USER.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            default_user: default_user_name(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("penny")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("penny")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PennyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Resolve the database path: `--db` flag beats the `PENNY_DB` environment
/// variable beats the settings data dir.
pub fn resolve_db_path(flag: Option<&str>) -> PathBuf {
    if let Some(path) = flag {
        return PathBuf::from(shellexpand_path(path));
    }
    if let Ok(path) = std::env::var("PENNY_DB") {
        if !path.is_empty() {
            return PathBuf::from(shellexpand_path(&path));
        }
    }
    PathBuf::from(&load_settings().data_dir).join("penny.db")
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/penny-test".to_string(),
            default_user: "alice".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let loaded: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.data_dir, "/tmp/penny-test");
        assert_eq!(loaded.default_user, "alice");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let json = r#"{"data_dir": "/tmp/penny-test"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.default_user, "default");
    }

    #[test]
    fn test_flag_beats_everything() {
        let path = resolve_db_path(Some("/tmp/explicit.db"));
        assert_eq!(path, PathBuf::from("/tmp/explicit.db"));
    }
}
