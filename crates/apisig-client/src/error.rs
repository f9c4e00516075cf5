//! Client error types.

use apisig_auth::SignError;

/// Errors raised by [`SignatureClient`](crate::SignatureClient).
///
/// Protocol rejections are not errors at this level: they arrive as
/// [`ApiResponse::Failure`](apisig_model::ApiResponse::Failure).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The client configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request could not be signed.
    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-200 status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// The HTTP status.
        status: http::StatusCode,
        /// The raw response body.
        body: String,
    },

    /// The response body is not a valid envelope.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}
