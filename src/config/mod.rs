//! User settings and on-disk locations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::currency;
use crate::notify;

/// Overrides the database location.
pub(crate) const DB_ENV: &str = "SPENDLOG_DB";

const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "spendlog.db";
const LOG_FILE: &str = "spendlog.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Currency for new users and for display when no user is signed in.
    pub(crate) currency: String,
    pub(crate) notification_capacity: usize,
    /// Replaces the built-in brand table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) brand_file: Option<PathBuf>,
    /// Username the dashboard opens with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) default_user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            notification_capacity: notify::DEFAULT_CAPACITY,
            brand_file: None,
            default_user: None,
        }
    }
}

impl Config {
    /// A missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn normalize(&mut self) {
        let code = self.currency.trim().to_uppercase();
        if currency::is_known(&code) {
            self.currency = code;
        } else {
            tracing::warn!(currency = %self.currency, "unknown currency in config, using USD");
            self.currency = "USD".into();
        }
        if self.notification_capacity == 0 {
            self.notification_capacity = notify::DEFAULT_CAPACITY;
        }
    }
}

/// Where spendlog keeps its files.
#[derive(Debug, Clone)]
pub(crate) struct AppPaths {
    pub(crate) data_dir: PathBuf,
    pub(crate) config_file: PathBuf,
    pub(crate) db_file: PathBuf,
    pub(crate) log_file: PathBuf,
}

impl AppPaths {
    pub(crate) fn resolve() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("com", "spendlog", "Spendlog")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let paths = Self::from_dirs(
            proj_dirs.data_dir(),
            proj_dirs.config_dir(),
            std::env::var_os(DB_ENV).map(PathBuf::from),
        );
        for dir in [proj_dirs.data_dir(), proj_dirs.config_dir()] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(paths)
    }

    fn from_dirs(data_dir: &Path, config_dir: &Path, db_override: Option<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            config_file: config_dir.join(CONFIG_FILE),
            db_file: db_override
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| data_dir.join(DB_FILE)),
            log_file: data_dir.join(LOG_FILE),
        }
    }
}
