//! Storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend to open and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type: "memory" or "redb".
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database file for the redb backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_backend() -> String {
    "memory".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// In-memory store.
    pub fn memory() -> Self {
        Self::default()
    }

    /// redb store at `path`.
    pub fn redb(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: "redb".to_string(),
            path: Some(path.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        let config: StoreConfig = toml::from_str("").unwrap();
        assert_eq!(config, StoreConfig::memory());
    }

    #[test]
    fn test_redb_from_toml() {
        let config: StoreConfig =
            toml::from_str("backend = \"redb\"\npath = \"/tmp/labval.redb\"").unwrap();
        assert_eq!(config, StoreConfig::redb("/tmp/labval.redb"));
    }
}
