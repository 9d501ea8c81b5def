//! Error types for the Luminate Online API wrapper.
//!
//! # Design
//! Every variant is terminal for the call that produced it. The `Display`
//! strings are the human-readable messages handed back to the admin panel
//! inside the error reply, so they stay short and stable.

/// Boxed error returned by an [`HttpClient`](crate::http::HttpClient) when the
/// request never produced an HTTP response (DNS, connect, TLS, I/O).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the mantle pipeline.
#[derive(thiserror::Error, Debug)]
pub enum MantleError {
    /// The request envelope carried no fields at all.
    #[error("Request Not Found")]
    EmptyRequest,

    /// The configuration store has no settings entry.
    #[error("Luminate Online Credentials Not Found")]
    MissingCredentials,

    /// A required setting is absent or blank.
    #[error("Luminate Online Credential Missing: {field}")]
    InvalidCredentials { field: &'static str },

    /// The envelope has no `data` field.
    #[error("Request Data Not Found")]
    MissingRequestData,

    /// The servlet shorthand is not one of the accepted tokens.
    #[error("Servlet Not Found")]
    UnknownEndpoint(String),

    /// Servlet or method was empty after normalization.
    #[error("Servlet Or Method Not Resolved")]
    UnresolvedTarget,

    #[error("Transport Error: {0}")]
    Transport(#[source] TransportError),

    /// The API answered with a status other than 200.
    #[error("Error: {code}")]
    Remote { code: u16 },

    #[error("Empty Response Received")]
    EmptyResponse,

    /// The body could not be decoded as JSON in structured mode.
    #[error("Response Decode Error: {0}")]
    Decode(#[source] serde_json::Error),
}
