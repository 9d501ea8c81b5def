//! Stateless request builder and response interpreter for Luminate Online.
//!
//! # Design
//! `MantleClient` holds only the configuration loaded for the current call.
//! `build_*` methods produce an `HttpRequest`, `parse_response` consumes an
//! `HttpResponse`; the caller executes the round-trip in between.

use url::form_urlencoded;

use crate::config::{MantleConfig, ResponseFormat};
use crate::error::MantleError;
use crate::http::{HttpRequest, HttpResponse, FORM_CONTENT_TYPE};
use crate::types::{CallTarget, RemoteBody, RequestEnvelope};

/// Builds API requests and interprets API responses for one configuration.
#[derive(Debug, Clone)]
pub struct MantleClient {
    config: MantleConfig,
}

impl MantleClient {
    pub fn new(config: MantleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MantleConfig {
        &self.config
    }

    /// Servlet URL, always HTTPS.
    pub fn build_url(&self, servlet: &str) -> String {
        format!(
            "https://{}/{}/site/{}",
            self.config.host_name, self.config.short_name, servlet
        )
    }

    /// Credentials block and method parameters, each form-encoded, joined by `&`.
    pub fn build_post_body(&self, target: &CallTarget) -> String {
        let base = form_urlencoded::Serializer::new(String::new())
            .append_pair("v", &self.config.api_version)
            .append_pair("api_key", &self.config.api_key)
            .append_pair("response_format", self.config.response_format.wire_value())
            .append_pair("login_name", &self.config.login_name)
            .append_pair("login_password", &self.config.login_password)
            .append_pair("method", &target.method)
            .finish();
        let method_data = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&target.params)
            .finish();
        format!("{base}&{method_data}")
    }

    pub fn build_request(&self, target: &CallTarget) -> HttpRequest {
        HttpRequest {
            url: self.build_url(&target.servlet),
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: self.build_post_body(target),
        }
    }

    /// Parse the envelope's `data` field and build the POST for it.
    pub fn build_call(&self, envelope: &RequestEnvelope) -> Result<HttpRequest, MantleError> {
        if envelope.is_empty() {
            return Err(MantleError::EmptyRequest);
        }
        let data = envelope.data().ok_or(MantleError::MissingRequestData)?;
        let target = CallTarget::from_data(data)?;
        if !target.is_resolved() {
            return Err(MantleError::UnresolvedTarget);
        }

        tracing::debug!(
            servlet = %target.servlet,
            method = %target.method,
            params = target.params.len(),
            "resolved call target"
        );
        Ok(self.build_request(&target))
    }

    /// Check status and body, then decode according to the response format.
    pub fn parse_response(&self, response: HttpResponse) -> Result<RemoteBody, MantleError> {
        if response.status != 200 {
            tracing::warn!(status = response.status, "remote API returned an error status");
            return Err(MantleError::Remote {
                code: response.status,
            });
        }
        if response.body.is_empty() {
            tracing::warn!("remote API returned an empty body");
            return Err(MantleError::EmptyResponse);
        }

        match self.config.response_format {
            ResponseFormat::Structured => serde_json::from_slice(&response.body)
                .map(RemoteBody::Structured)
                .map_err(|e| {
                    tracing::warn!(error = %e, "failed to decode remote API response");
                    MantleError::Decode(e)
                }),
            ResponseFormat::Passthrough(_) => Ok(RemoteBody::Raw(response.body)),
        }
    }
}
