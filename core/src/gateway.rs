//! Entry point used by the admin panel: one envelope in, one API answer out.

use crate::client::MantleClient;
use crate::config::{ConfigStore, MantleConfig};
use crate::error::MantleError;
use crate::http::HttpClient;
use crate::types::{RemoteBody, Reply, RequestEnvelope};

/// Forwards admin-panel requests to Luminate Online.
///
/// Holds only the configuration store and the HTTP client. Credentials are
/// reloaded on every call and all per-call state stays local, so one
/// `Mantle` can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Mantle<S, H> {
    store: S,
    http: H,
}

impl<S: ConfigStore, H: HttpClient> Mantle<S, H> {
    pub fn new(store: S, http: H) -> Self {
        Self { store, http }
    }

    /// Resolve the envelope, POST it, and return the decoded or raw body.
    pub fn call(&self, envelope: &RequestEnvelope) -> Result<RemoteBody, MantleError> {
        if envelope.is_empty() {
            return Err(MantleError::EmptyRequest);
        }
        let client = MantleClient::new(MantleConfig::load(&self.store)?);
        let request = client.build_call(envelope)?;

        let response = self.http.post(&request).map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "request to remote API failed");
            MantleError::Transport(e)
        })?;
        client.parse_response(response)
    }

    /// Same as [`call`](Self::call), folded into the reply shape.
    pub fn reply(&self, envelope: &RequestEnvelope) -> Reply {
        Reply::from(self.call(envelope))
    }
}
