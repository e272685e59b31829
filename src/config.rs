//! Persistent configuration model loaded from `config.toml`.

use std::path::{Path, PathBuf};

use log::warn;

use crate::error::ImportError;

/// Root configuration. Every field has a default so a missing or partial
/// file still yields a usable config; CLI flags override anything here.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Remote server connection settings.
    pub connection: ConnectionConfig,
    #[serde(default)]
    /// Default import behavior flags.
    pub import: ImportConfig,
}

/// Connection settings for the OpenSubsonic server.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub username: String,
    /// Keyring key for the stored password; lets several server profiles
    /// coexist on one machine.
    #[serde(default = "default_profile_id")]
    pub profile_id: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: String::new(),
            profile_id: default_profile_id(),
        }
    }
}

/// Default run options, each overridable per invocation.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub create_if_missing: bool,
    #[serde(default)]
    pub skip_duplicates: bool,
}

fn default_profile_id() -> String {
    "default".to_string()
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|directory| directory.join("tunelift").join("config.toml"))
}

/// Loads the config. An explicitly passed path must exist and parse; the
/// default path is optional and falls back to defaults with a warning on
/// parse failure.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, ImportError> {
    if let Some(path) = explicit_path {
        let content = std::fs::read_to_string(path).map_err(|err| {
            ImportError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        return toml::from_str(&content).map_err(|err| {
            ImportError::Config(format!("failed to parse {}: {err}", path.display()))
        });
    }

    let Some(path) = default_config_path() else {
        return Ok(Config::default());
    };
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Ok(Config::default()),
    };
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            warn!(
                "Failed to parse config file {}. Using defaults. error={}",
                path.display(),
                err
            );
            Ok(Config::default())
        }
    }
}
