//! Environment-driven configuration.

use std::path::PathBuf;

use thiserror::Error;

use craftledger_builds::ReversalPolicy;
use craftledger_observability::LogFormat;

pub const CATALOG_VAR: &str = "CRAFTLEDGER_CATALOG";
pub const MATERIAL_INFO_VAR: &str = "CRAFTLEDGER_MATERIAL_INFO";
pub const DATA_DIR_VAR: &str = "CRAFTLEDGER_DATA_DIR";
pub const REVERSAL_VAR: &str = "CRAFTLEDGER_REVERSAL";
pub const LOG_FORMAT_VAR: &str = "CRAFTLEDGER_LOG_FORMAT";

const DEFAULT_CATALOG: &str = "assets/data/recipes.json";
const DEFAULT_DATA_DIR: &str = ".craftledger";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    /// Factory material table; without it every material reconciles as a shop item.
    pub material_info_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub reversal: ReversalPolicy,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG),
            material_info_path: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            reversal: ReversalPolicy::default(),
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(path) = get(CATALOG_VAR) {
            config.catalog_path = PathBuf::from(path);
        }
        config.material_info_path = get(MATERIAL_INFO_VAR).map(PathBuf::from);
        if let Some(dir) = get(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(REVERSAL_VAR) {
            config.reversal = match raw.to_lowercase().as_str() {
                "reexpand" => ReversalPolicy::Reexpand,
                "snapshot" => ReversalPolicy::Snapshot,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: REVERSAL_VAR,
                        message: format!("'{raw}' (expected reexpand or snapshot)"),
                    });
                }
            };
        }
        if let Some(raw) = get(LOG_FORMAT_VAR) {
            config.log_format = raw
                .parse()
                .map_err(|message| ConfigError::Invalid { var: LOG_FORMAT_VAR, message })?;
        }

        Ok(config)
    }

    pub fn materials_path(&self) -> PathBuf {
        self.data_dir.join("materials.json")
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join("orders.json")
    }
}
