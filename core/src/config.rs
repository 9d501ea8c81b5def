//! Luminate Online credentials and the store they are loaded from.
//!
//! # Design
//! The admin panel persists credentials as a flat option mapping. That
//! mapping is read through [`ConfigStore`] on every call and turned into a
//! typed [`MantleConfig`] field by field, so a blank or missing credential is
//! caught before any request is built.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MantleError;

pub const HOST_NAME_KEY: &str = "luminate_mantle_host_name";
pub const SHORT_NAME_KEY: &str = "luminate_mantle_short_name";
pub const API_KEY_KEY: &str = "luminate_mantle_api_key";
pub const LOGIN_NAME_KEY: &str = "luminate_mantle_login_name";
pub const LOGIN_PASSWORD_KEY: &str = "luminate_mantle_login_password";
pub const API_VERSION_KEY: &str = "v";
pub const RESPONSE_FORMAT_KEY: &str = "response_format";

pub const DEFAULT_API_VERSION: &str = "1.0";

/// Raw option mapping as stored by the admin panel.
pub type Settings = HashMap<String, String>;

/// Source of the credential settings. Implementations only read.
pub trait ConfigStore {
    /// Returns `None` when nothing has been saved yet. An empty mapping is
    /// treated the same way by [`MantleConfig::load`].
    fn load_settings(&self) -> Option<Settings>;
}

impl ConfigStore for Settings {
    fn load_settings(&self) -> Option<Settings> {
        Some(self.clone())
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn load_settings(&self) -> Option<Settings> {
        (**self).load_settings()
    }
}

/// How the API should format its answer and how the body is handed back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseFormat {
    /// Ask for JSON and decode it into a structured value.
    #[default]
    Structured,
    /// Ask for this format and return the body untouched.
    Passthrough(String),
}

impl ResponseFormat {
    /// Value sent as `response_format` in the POST body.
    pub fn wire_value(&self) -> &str {
        match self {
            ResponseFormat::Structured => "json",
            ResponseFormat::Passthrough(format) => format,
        }
    }
}

impl From<&str> for ResponseFormat {
    fn from(value: &str) -> Self {
        match value {
            "php" | "structured" => ResponseFormat::Structured,
            other => ResponseFormat::Passthrough(other.to_string()),
        }
    }
}

impl From<String> for ResponseFormat {
    fn from(value: String) -> Self {
        ResponseFormat::from(value.as_str())
    }
}

impl From<ResponseFormat> for String {
    fn from(format: ResponseFormat) -> Self {
        match format {
            ResponseFormat::Structured => "structured".to_string(),
            ResponseFormat::Passthrough(format) => format,
        }
    }
}

/// Credentials and request options for one call.
#[derive(Clone, PartialEq, Eq)]
pub struct MantleConfig {
    pub host_name: String,
    pub short_name: String,
    pub api_key: String,
    pub login_name: String,
    pub login_password: String,
    pub api_version: String,
    pub response_format: ResponseFormat,
}

impl MantleConfig {
    /// Build a config from the stored option mapping.
    ///
    /// The five credential keys are required and must not be blank. `v` and
    /// `response_format` fall back to `1.0` and structured decoding.
    pub fn from_settings(settings: &Settings) -> Result<Self, MantleError> {
        Ok(MantleConfig {
            host_name: required(settings, HOST_NAME_KEY)?,
            short_name: required(settings, SHORT_NAME_KEY)?,
            api_key: required(settings, API_KEY_KEY)?,
            login_name: required(settings, LOGIN_NAME_KEY)?,
            login_password: required(settings, LOGIN_PASSWORD_KEY)?,
            api_version: optional(settings, API_VERSION_KEY)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            response_format: optional(settings, RESPONSE_FORMAT_KEY)
                .map(ResponseFormat::from)
                .unwrap_or_default(),
        })
    }

    /// Load and validate the config from `store`.
    pub fn load(store: &impl ConfigStore) -> Result<Self, MantleError> {
        let settings = store
            .load_settings()
            .filter(|settings| !settings.is_empty())
            .ok_or(MantleError::MissingCredentials)?;
        Self::from_settings(&settings)
    }
}

impl fmt::Debug for MantleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MantleConfig")
            .field("host_name", &self.host_name)
            .field("short_name", &self.short_name)
            .field("api_key", &"<redacted>")
            .field("login_name", &self.login_name)
            .field("login_password", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("response_format", &self.response_format)
            .finish()
    }
}

fn required(settings: &Settings, key: &'static str) -> Result<String, MantleError> {
    optional(settings, key).ok_or(MantleError::InvalidCredentials { field: key })
}

fn optional(settings: &Settings, key: &str) -> Option<String> {
    settings
        .get(key)
        .filter(|value| !value.trim().is_empty())
        .cloned()
}
