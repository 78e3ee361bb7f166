// Hosting API error types
use thiserror::Error;

/// Errors raised while talking to the hosting API. Every variant names the
/// request path that failed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("error calling hosting API at {path}: {message}")]
    Transport { path: String, message: String },

    #[error("not found path {path}")]
    NotFound { path: String },

    #[error("request to {path} failed with status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {path}: {reason}")]
    UnexpectedShape { path: String, reason: String },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
