use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DB_PATH_KEY: &str = "db_path";
pub const EXPORT_DIR_KEY: &str = "export_dir";

/// Flat string map stored as TOML.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub map: BTreeMap<String, String>,
}

impl Config {
    /// A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).with_context(|| format!("Could not read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let raw = toml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, raw).with_context(|| format!("Failed to save config to {}", path.display()))
    }

    /// `--db` wins over the `db_path` key, which wins over the default.
    pub fn db_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        match self.map.get(DB_PATH_KEY) {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_db_path(),
        }
    }

    /// Where backups are written; the current directory unless configured.
    pub fn export_dir(&self) -> PathBuf {
        self.map
            .get(EXPORT_DIR_KEY)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("gymtracker").join("config.toml"))
        .context("Could not determine config directory")
}

pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("gymtracker").join("gymtracker.db"))
        .context("Could not determine data directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let mut cfg = Config::default();
        cfg.map.insert(DB_PATH_KEY.into(), "/tmp/gym.db".into());
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.map.get(DB_PATH_KEY).map(String::as_str), Some("/tmp/gym.db"));
    }

    #[test]
    fn db_path_precedence() {
        let mut cfg = Config::default();
        cfg.map.insert(DB_PATH_KEY.into(), "from-config.db".into());

        assert_eq!(cfg.db_path(Some(Path::new("flag.db"))).unwrap(), PathBuf::from("flag.db"));
        assert_eq!(cfg.db_path(None).unwrap(), PathBuf::from("from-config.db"));
    }

    #[test]
    fn export_dir_defaults_to_cwd() {
        let mut cfg = Config::default();
        assert_eq!(cfg.export_dir(), PathBuf::from("."));
        cfg.map.insert(EXPORT_DIR_KEY.into(), "/backups".into());
        assert_eq!(cfg.export_dir(), PathBuf::from("/backups"));
    }
}
