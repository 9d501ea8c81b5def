use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Endpoint identifiers served under `/{short_name}/site/`.
pub const ENDPOINTS: [&str; 13] = [
    "CRAddressBookAPI",
    "SRAdvocacyAPI",
    "SRConnectAPI",
    "SRConsAPI",
    "CRContentAPI",
    "SRDataSyncAPI",
    "SRDonationAPI",
    "SREventAPI",
    "SRGroupAPI",
    "CROrgEventAPI",
    "SRRecurringAPI",
    "CRSurveyAPI",
    "CRTeamraiserAPI",
];

/// Form fields that carry credentials rather than method parameters.
const RESERVED_FIELDS: [&str; 6] = [
    "v",
    "api_key",
    "response_format",
    "login_name",
    "login_password",
    "method",
];

/// Credentials the mock site accepts.
#[derive(Clone, Debug)]
pub struct Site {
    pub short_name: String,
    pub api_key: String,
    pub login_name: String,
    pub login_password: String,
}

impl Default for Site {
    fn default() -> Self {
        Site {
            short_name: "mock".to_string(),
            api_key: "mock-api-key".to_string(),
            login_name: "apiuser".to_string(),
            login_password: "apipass".to_string(),
        }
    }
}

/// A POST that reached a known endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedCall {
    pub servlet: String,
    pub form: BTreeMap<String, String>,
}

#[derive(Clone, Debug)]
pub struct AppState {
    site: Arc<Site>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl AppState {
    pub fn new(site: Site) -> Self {
        AppState {
            site: Arc::new(site),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// For callers outside the server's runtime.
    pub fn calls_blocking(&self) -> Vec<RecordedCall> {
        self.calls.blocking_read().clone()
    }
}

pub fn app() -> Router {
    app_with_state(AppState::new(Site::default()))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/{short_name}/site/{servlet}", post(handle_api_call))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn handle_api_call(
    State(state): State<AppState>,
    Path((short_name, servlet)): Path<(String, String)>,
    Form(form): Form<BTreeMap<String, String>>,
) -> Response {
    if short_name != state.site.short_name || !ENDPOINTS.contains(&servlet.as_str()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.calls.write().await.push(RecordedCall {
        servlet: servlet.clone(),
        form: form.clone(),
    });

    if form.get("api_key") != Some(&state.site.api_key) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let logged_in = form.get("login_name") == Some(&state.site.login_name)
        && form.get("login_password") == Some(&state.site.login_password);
    let method = form.get("method").filter(|m| !m.is_empty());

    let answer = match (logged_in, method) {
        (false, _) => Answer::Error {
            code: 4,
            message: "Invalid login name or password.".to_string(),
        },
        (true, None) => Answer::Error {
            code: 2,
            message: "Method not specified.".to_string(),
        },
        (true, Some(method)) if !is_method_name(method) => Answer::Error {
            code: 3,
            message: "Invalid method name.".to_string(),
        },
        (true, Some(method)) => Answer::Success {
            servlet,
            method: method.clone(),
            version: form.get("v").cloned().unwrap_or_default(),
            params: form
                .iter()
                .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        },
    };

    match form.get("response_format").map(String::as_str) {
        Some("json") => Json(answer.to_json()).into_response(),
        _ => ([(header::CONTENT_TYPE, "text/xml")], answer.to_xml()).into_response(),
    }
}

/// What the mock site answers with, before picking a wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Success {
        servlet: String,
        method: String,
        version: String,
        params: BTreeMap<String, String>,
    },
    Error {
        code: u32,
        message: String,
    },
}

impl Answer {
    pub fn to_json(&self) -> Value {
        match self {
            Answer::Success {
                servlet,
                method,
                version,
                params,
            } => {
                let mut root = serde_json::Map::new();
                root.insert(
                    format!("{method}Response"),
                    json!({
                        "servlet": servlet,
                        "method": method,
                        "v": version,
                        "params": params,
                    }),
                );
                Value::Object(root)
            }
            Answer::Error { code, message } => json!({
                "errorResponse": { "code": code.to_string(), "message": message }
            }),
        }
    }

    pub fn to_xml(&self) -> String {
        match self {
            Answer::Success {
                servlet, method, ..
            } => format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><{method}Response servlet="{}"/>"#,
                escape_xml(servlet)
            ),
            Answer::Error { code, message } => format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><errorResponse><code>{code}</code><message>{}</message></errorResponse>"#,
                escape_xml(message)
            ),
        }
    }
}

/// Method names become XML tag names, so only identifiers are served.
fn is_method_name(method: &str) -> bool {
    let mut chars = method.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success() -> Answer {
        Answer::Success {
            servlet: "SRConsAPI".to_string(),
            method: "getUser".to_string(),
            version: "1.0".to_string(),
            params: [("cons_id".to_string(), "42".to_string())].into(),
        }
    }

    #[test]
    fn success_json_is_keyed_by_method() {
        let json = success().to_json();
        assert_eq!(json["getUserResponse"]["servlet"], "SRConsAPI");
        assert_eq!(json["getUserResponse"]["params"]["cons_id"], "42");
    }

    #[test]
    fn error_json_uses_error_response() {
        let json = Answer::Error {
            code: 4,
            message: "nope".to_string(),
        }
        .to_json();
        assert_eq!(json["errorResponse"]["code"], "4");
        assert_eq!(json["errorResponse"]["message"], "nope");
    }

    #[test]
    fn method_names_are_identifiers() {
        assert!(is_method_name("getUser"));
        assert!(is_method_name("_list2"));
        assert!(!is_method_name(""));
        assert!(!is_method_name("2fa"));
        assert!(!is_method_name(r#"a"/><x"#));
        assert!(!is_method_name("get user"));
    }

    #[test]
    fn xml_escapes_message() {
        let xml = Answer::Error {
            code: 2,
            message: "a < b & c".to_string(),
        }
        .to_xml();
        assert!(xml.contains("<message>a &lt; b &amp; c</message>"));
    }

    #[test]
    fn success_xml_names_servlet() {
        let xml = success().to_xml();
        assert!(xml.contains(r#"<getUserResponse servlet="SRConsAPI"/>"#));
    }

    #[test]
    fn default_site_credentials() {
        let site = Site::default();
        assert_eq!(site.short_name, "mock");
        assert_eq!(site.api_key, "mock-api-key");
    }
}
