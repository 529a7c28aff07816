//! Store configuration.
//!
//! Locates the listings file and the username registry on disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_LISTINGS_PATH: &str = "/tmp/items.csv";
pub const DEFAULT_USERS_PATH: &str = "/tmp/users.csv";

pub const LISTINGS_FILE_NAME: &str = "items.csv";
pub const USERS_FILE_NAME: &str = "users.csv";

/// Configuration for a record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Listings file (CSV container of `|`-delimited records).
    /// Default: /tmp/items.csv
    pub listings_path: PathBuf,

    /// Username registry, one name per line.
    /// Default: /tmp/users.csv
    pub users_path: PathBuf,

    /// Hold an exclusive advisory lock while mutating.
    /// Default: true
    #[serde(default = "default_lock")]
    pub lock: bool,
}

fn default_lock() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            listings_path: PathBuf::from(DEFAULT_LISTINGS_PATH),
            users_path: PathBuf::from(DEFAULT_USERS_PATH),
            lock: true,
        }
    }
}

impl StoreConfig {
    /// Both files inside `dir`, using the default file names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            listings_path: dir.join(LISTINGS_FILE_NAME),
            users_path: dir.join(USERS_FILE_NAME),
            lock: true,
        }
    }

    pub fn without_lock(mut self) -> Self {
        self.lock = false;
        self
    }

    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .listings_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| LISTINGS_FILE_NAME.into());
        name.push(".lock");
        self.listings_path.with_file_name(name)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.listings_path, PathBuf::from("/tmp/items.csv"));
        assert_eq!(config.users_path, PathBuf::from("/tmp/users.csv"));
        assert!(config.lock);
    }

    #[test]
    fn test_lock_path_is_sibling() {
        let config = StoreConfig::in_dir("/data/market");
        assert_eq!(config.lock_path(), PathBuf::from("/data/market/items.csv.lock"));
    }

    #[test]
    fn test_lock_defaults_on_when_missing() {
        let json = r#"{"listings_path":"/a/items.csv","users_path":"/a/users.csv"}"#;
        let config: StoreConfig = serde_json::from_str(json).unwrap();
        assert!(config.lock);
        assert_eq!(config.users_path, PathBuf::from("/a/users.csv"));
    }

    #[test]
    fn test_bad_json_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{\"listings_path\": 3}").expect("write config");
        let err = StoreConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_missing_config_file_is_io() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = StoreConfig::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_store_config_serialization() {
        let config = StoreConfig::in_dir("/srv").without_lock();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
