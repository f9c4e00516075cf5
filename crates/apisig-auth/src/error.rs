//! Error types for request signature verification.
//!
//! All verification failures are represented by [`AuthError`]. Each variant
//! maps to exactly one wire [`ErrorCode`] through [`AuthError::code`]; several
//! variants may share a code when they only differ in the diagnostic message.

use apisig_model::{ApiError, ErrorCode};

/// Errors that can occur while verifying a signed request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The `Signature` query parameter (or its cut point in the request target) is missing.
    #[error("not found Signature")]
    SignatureNotFound,

    /// The `Timestamp` query parameter is missing.
    #[error("not found url'param Timestamp.")]
    MissingTimestamp,

    /// The `Timestamp` query parameter is not a decimal Unix time.
    #[error("invalid param: Timestamp.")]
    InvalidTimestamp(String),

    /// The `Timestamp` is outside the allowed clock skew.
    #[error("signature expire.")]
    SignatureExpired {
        /// The timestamp supplied by the client.
        timestamp: i64,
        /// The verifier's clock when the check ran.
        now: i64,
    },

    /// The `SecretId` query parameter is missing.
    #[error("not found SecretId")]
    MissingSecretId,

    /// The secret store could not resolve the `SecretId`.
    #[error("invalid SecretId: {0}")]
    InvalidSecretId(String),

    /// The `HashedRequestPayload` does not match the request body.
    #[error("Request' Payload Signature verify failed")]
    PayloadSignatureMismatch,

    /// The `Nonce` query parameter is missing.
    #[error("not found url'param Nonce.")]
    MissingNonce,

    /// The computed signature does not match the provided signature.
    #[error("Signature verify failed")]
    SignatureDoesNotMatch,
}

impl AuthError {
    /// The wire code reported to the client for this failure.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SignatureNotFound => ErrorCode::SignatureNotFound,
            Self::MissingTimestamp | Self::InvalidTimestamp(_) | Self::SignatureExpired { .. } => {
                ErrorCode::SignatureExpire
            }
            Self::MissingSecretId => ErrorCode::SecretIdNotFound,
            Self::InvalidSecretId(_) => ErrorCode::InvalidSecretId,
            Self::PayloadSignatureMismatch => ErrorCode::PayloadSigFailure,
            Self::MissingNonce => ErrorCode::NonceNotFound,
            Self::SignatureDoesNotMatch => ErrorCode::SignatureFailure,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::with_message(err.code(), err.to_string())
    }
}
