use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_KEY_ENV: &str = "NOTES_ENCRYPTION_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Overrides the platform data directory when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_collection_file")]
    pub collection_file: String,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            collection_file: default_collection_file(),
            backup_dir: default_backup_dir(),
        }
    }
}

fn default_collection_file() -> String {
    "notes.json".to_string()
}

fn default_backup_dir() -> String {
    "backups".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupConfig {
    /// Keep only the newest N snapshots. `None` keeps every snapshot.
    #[serde(default)]
    pub retain: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityConfig {
    #[serde(default)]
    pub encrypt_by_default: bool,
    /// Environment variable the passphrase is read from.
    #[serde(default = "default_key_env")]
    pub key_env: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            encrypt_by_default: false,
            key_env: default_key_env(),
        }
    }
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisConfig {
    #[serde(default = "default_max_auto_tags")]
    pub max_auto_tags: usize,
    #[serde(default = "default_summary_max_len")]
    pub summary_max_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_auto_tags: default_max_auto_tags(),
            summary_max_len: default_summary_max_len(),
        }
    }
}

const fn default_max_auto_tags() -> usize {
    5
}

const fn default_summary_max_len() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backups: BackupConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            storage: StorageConfig::default(),
            backups: BackupConfig::default(),
            security: SecurityConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Data directory: the configured override or `<platform data dir>/notes`.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        let mut dir = dirs::data_local_dir().context("failed to resolve data_local_dir")?;
        dir.push("notes");
        Ok(dir)
    }

    pub fn collection_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.storage.collection_file))
    }

    pub fn backup_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.storage.backup_dir))
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push("notes");
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        if self.migrate(&mut config) {
            self.save(&config)?;
        }
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) -> bool {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return false;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );
        config.schema_version = CURRENT_SCHEMA_VERSION;
        true
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.analysis.max_auto_tags, 5);
        assert_eq!(config.backups.retain, None);
        assert!(store.path().exists());
    }

    #[test]
    fn fills_missing_sections_and_migrates_old_schema() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{ "schema_version": 0, "analysis": { "max_auto_tags": 3 } }"#,
        )
        .expect("seed config");

        let config = store.load_or_init().expect("load");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.analysis.max_auto_tags, 3);
        assert_eq!(config.analysis.summary_max_len, 100);
        assert_eq!(config.security.key_env, DEFAULT_KEY_ENV);

        let reread: AppConfig =
            serde_json::from_str(&fs::read_to_string(store.path()).expect("read"))
                .expect("parse");
        assert_eq!(reread, config);
    }

    #[test]
    fn data_dir_override_drives_paths() {
        let dir = tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        assert_eq!(
            config.collection_path().expect("path"),
            dir.path().join("notes.json")
        );
        assert_eq!(config.backup_dir().expect("path"), dir.path().join("backups"));
    }

    #[test]
    fn rejects_unparseable_config() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(store.path(), "{ not json").expect("seed config");
        let err = store.load_or_init().expect_err("must fail");
        assert!(err.to_string().contains("failed to parse"));
    }
}
