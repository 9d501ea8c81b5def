//! Per-call values that flow through the pipeline.
//!
//! # Design
//! Nothing here outlives a call. The envelope arrives from the admin panel,
//! is parsed into a [`CallTarget`], and the API answer comes back as a
//! [`RemoteBody`] which the host wraps in a [`Reply`].

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::MantleError;
use crate::servlet;

/// Field of the envelope holding the form-encoded request.
pub const DATA_FIELD: &str = "data";

/// Raw payload posted by the admin panel, e.g.
/// `{ "data": "servlet=cons&method=getUser&cons_id=42" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestEnvelope {
    fields: BTreeMap<String, String>,
}

impl RequestEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Envelope with only a `data` field.
    pub fn from_data(data: impl Into<String>) -> Self {
        let mut envelope = Self::new();
        envelope.insert(DATA_FIELD, data);
        envelope
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `data` field, if present and non-empty.
    pub fn data(&self) -> Option<&str> {
        self.fields
            .get(DATA_FIELD)
            .map(String::as_str)
            .filter(|data| !data.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestEnvelope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Normalized servlet, method and method parameters for one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    /// Endpoint identifier such as `SRConsAPI`.
    pub servlet: String,
    pub method: String,
    /// Method parameters in caller order. A repeated key keeps its first
    /// position and its last value.
    pub params: IndexMap<String, String>,
}

impl CallTarget {
    /// Parse the form-encoded `data` string and normalize its servlet.
    ///
    /// `servlet` and `method` are reserved keys. Every other key becomes a
    /// method parameter; `params[name]` is accepted as a spelling of `name`.
    pub fn from_data(data: &str) -> Result<Self, MantleError> {
        let mut shorthand = String::new();
        let mut method = String::new();
        let mut params = IndexMap::new();

        for (key, value) in form_urlencoded::parse(data.as_bytes()) {
            match key.as_ref() {
                "servlet" => shorthand = value.into_owned(),
                "method" => method = value.into_owned(),
                other => {
                    params.insert(param_name(other).to_string(), value.into_owned());
                }
            }
        }

        Ok(CallTarget {
            servlet: servlet::normalize(&shorthand)?,
            method,
            params,
        })
    }

    pub fn is_resolved(&self) -> bool {
        !self.servlet.is_empty() && !self.method.is_empty()
    }
}

fn param_name(key: &str) -> &str {
    key.strip_prefix("params[")
        .and_then(|rest| rest.strip_suffix(']'))
        .filter(|name| !name.is_empty())
        .unwrap_or(key)
}

/// Body of a successful API answer.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteBody {
    /// Decoded JSON document.
    Structured(Value),
    /// Body exactly as received, byte for byte.
    Raw(Vec<u8>),
}

impl RemoteBody {
    /// JSON form used in the reply. A raw body becomes a string; bytes that
    /// are not UTF-8 are replaced, since JSON text cannot carry them.
    pub fn into_value(self) -> Value {
        match self {
            RemoteBody::Structured(value) => value,
            RemoteBody::Raw(body) => Value::String(String::from_utf8_lossy(&body).into_owned()),
        }
    }
}

/// Answer handed back to the admin panel: `{"success": bool, "data": ...}`.
///
/// On failure `data` holds the error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    pub data: Value,
}

impl Reply {
    pub fn success(body: RemoteBody) -> Self {
        Reply {
            success: true,
            data: body.into_value(),
        }
    }

    pub fn error(err: &MantleError) -> Self {
        Reply {
            success: false,
            data: Value::String(err.to_string()),
        }
    }
}

impl From<Result<RemoteBody, MantleError>> for Reply {
    fn from(result: Result<RemoteBody, MantleError>) -> Self {
        match result {
            Ok(body) => Reply::success(body),
            Err(err) => Reply::error(&err),
        }
    }
}
