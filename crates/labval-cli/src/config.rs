//! `labval` configuration file.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3001
//!
//! [storage]
//! backend = "redb"
//! path = "/var/lib/labval/labval.redb"
//!
//! [execution]
//! step_delay_ms = 1000
//!
//! [client]
//! base_url = "http://localhost:3001"
//! ```

use labval_api::ServerConfig;
use labval_client::ClientConfig;
use labval_store::StoreConfig;
use labval_workflows::ExecutionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Name used for the config directory and environment variables.
pub const PROJECT_NAME: &str = "labval";

/// Every section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabvalConfig {
    /// API server listen address
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store
    #[serde(default)]
    pub storage: StoreConfig,

    /// Execution engine tuning
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Where commands send their requests
    #[serde(default)]
    pub client: ClientConfig,
}

impl LabvalConfig {
    /// `<config dir>/labval/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// The explicit path when given, the default path otherwise.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    /// Loads the configuration; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed,
    /// or when a setting is out of range.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit) else {
            tracing::debug!("No config directory on this platform, using defaults");
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io_with_path(e, &path))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Checks settings the TOML types alone cannot constrain.
    ///
    /// # Errors
    ///
    /// Returns a config error for out-of-range execution probabilities.
    pub fn validate(&self) -> Result<()> {
        self.execution
            .validate()
            .map_err(|e| Error::config(e.to_string()))
    }

    /// Pretty TOML rendering.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// `LABVAL_<SECTION>_<KEY>` pairs for every scalar setting.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        collect_env_vars(&value, &PROJECT_NAME.to_uppercase(), &mut vars);
        Ok(vars)
    }
}

fn collect_env_vars(value: &toml::Value, prefix: &str, vars: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, value) in table {
                collect_env_vars(value, &format!("{prefix}_{}", key.to_uppercase()), vars);
            }
        }
        toml::Value::String(s) => vars.push((prefix.to_string(), s.clone())),
        other => vars.push((prefix.to_string(), other.to_string())),
    }
}
