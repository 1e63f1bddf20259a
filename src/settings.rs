//! Персистентность настроек приложения
//!
//! Храним только settings.json в data_local_dir()/slashco-sense/,
//! никаких произвольных путей. История сессий не сохраняется.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::AppSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsFile {
    pub version: u32,
    pub settings: AppSettings,
}

fn app_data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("slashco-sense"))
}

fn settings_path() -> Option<PathBuf> {
    app_data_dir().map(|d| d.join("settings.json"))
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    // Windows: rename поверх существующего может падать, поэтому сначала удаляем старый.
    if path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(tmp, path)?;
    Ok(())
}

pub fn load_settings() -> io::Result<Option<AppSettings>> {
    let Some(path) = settings_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(&path)?;
    let parsed: SettingsFile =
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(parsed.settings))
}

pub fn save_settings(settings: &AppSettings) -> io::Result<()> {
    let Some(path) = settings_path() else {
        return Ok(());
    };

    let file = SettingsFile {
        version: 1,
        settings: settings.clone(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    atomic_write(&path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_file_round_trip() {
        let settings = AppSettings {
            custom_log_dir: Some("D:\\VRChat\\Logs".to_string()),
            osc_enabled: true,
            osc_host: "127.0.0.1".to_string(),
            osc_port: 9001,
            poll_interval_ms: 250,
        };
        let file = SettingsFile {
            version: 1,
            settings,
        };

        let json = serde_json::to_string(&file).unwrap();
        let parsed: SettingsFile = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.settings.custom_log_dir.as_deref(), Some("D:\\VRChat\\Logs"));
        assert!(parsed.settings.osc_enabled);
        assert_eq!(parsed.settings.osc_port, 9001);
        assert_eq!(parsed.settings.poll_interval_ms, 250);
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        atomic_write(&path, "{\"a\":1}").unwrap();
        atomic_write(&path, "{\"a\":2}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":2}");
    }
}
