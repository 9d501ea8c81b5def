//! YAML settings file used as the credential store.
//!
//! The file is either a flat mapping of the admin panel's option names or
//! the same mapping nested under `luminate_mantle_settings`:
//!
//! ```yaml
//! luminate_mantle_settings:
//!   luminate_mantle_host_name: secure2.convio.net
//!   luminate_mantle_short_name: myorg
//!   luminate_mantle_api_key: abc123
//!   luminate_mantle_login_name: apiuser
//!   luminate_mantle_login_password: secret
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mantle_core::{ConfigStore, Settings};
use serde::Deserialize;
use serde_yaml::Value;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingsFile {
    Nested {
        luminate_mantle_settings: HashMap<String, Value>,
    },
    Flat(HashMap<String, Value>),
}

/// Reads the settings file on every load, so edits apply to the next call.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `Ok(None)` when the file does not exist.
    pub fn read(&self) -> Result<Option<Settings>, SettingsError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Some(Settings::new()));
        }

        let file: SettingsFile =
            serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let raw = match file {
            SettingsFile::Nested {
                luminate_mantle_settings,
            } => luminate_mantle_settings,
            SettingsFile::Flat(raw) => raw,
        };
        Ok(Some(
            raw.into_iter()
                .filter_map(|(key, value)| scalar_to_string(value).map(|value| (key, value)))
                .collect(),
        ))
    }
}

impl ConfigStore for FileStore {
    fn load_settings(&self) -> Option<Settings> {
        match self.read() {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable settings file");
                None
            }
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
