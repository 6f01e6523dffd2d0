use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Who picks the target at the start of a game
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SecretMode {
    /// the computer draws a random number
    #[default]
    Random,
    /// a second player types the secret in (pass and play)
    Chosen,
}

impl SecretMode {
    pub fn toggled(self) -> Self {
        match self {
            SecretMode::Random => SecretMode::Chosen,
            SecretMode::Chosen => SecretMode::Random,
        }
    }
}

impl FromStr for SecretMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(SecretMode::Random),
            "chosen" => Ok(SecretMode::Chosen),
            other => Err(format!("unknown secret mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub secret_mode: SecretMode,
    pub record_history: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_mode: SecretMode::Random,
            record_history: true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "guessr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("guessr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
            tracing::warn!(path = %self.path.display(), "ignoring unreadable config");
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            secret_mode: SecretMode::Chosen,
            record_history: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "secret_mode": "chosen" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.secret_mode, SecretMode::Chosen);
        assert!(cfg.record_history);
    }

    #[test]
    fn secret_mode_text_forms() {
        assert_eq!(SecretMode::Random.to_string(), "random");
        assert_eq!(SecretMode::Chosen.to_string(), "chosen");
        assert_eq!("Chosen".parse::<SecretMode>(), Ok(SecretMode::Chosen));
        assert!("both".parse::<SecretMode>().is_err());
        assert_eq!(SecretMode::Random.toggled(), SecretMode::Chosen);
        assert_eq!(SecretMode::Chosen.toggled(), SecretMode::Random);
    }
}
