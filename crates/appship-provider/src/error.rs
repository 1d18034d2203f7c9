//! Error types for appship-provider

use thiserror::Error;

/// Errors raised while talking to the build provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure (connect, TLS, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-200 status
    #[error("{operation} failed with status {status}")]
    Status { operation: &'static str, status: u16 },

    /// The response body did not match the expected shape
    #[error("{operation} returned an undecodable body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The provider handed back a cursor it had already served
    #[error("pagination cursor repeated: {0}")]
    CursorLoop(String),

    /// Unknown app, build or artifact
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
