//! apisig error codes.
//!
//! Every response envelope carries a numeric `Code`. The numbering is part of
//! the wire contract shared with existing clients and must not be reordered.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Well-known apisig result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    /// The request succeeded.
    #[default]
    Success,
    /// Malformed application-level input.
    InvalidParameter,
    /// No `Signature` query parameter was supplied.
    SignatureNotFound,
    /// The `SecretId` was supplied but could not be resolved.
    InvalidSecretId,
    /// No `SecretId` query parameter was supplied.
    SecretIdNotFound,
    /// The `Timestamp` is missing, malformed or outside the freshness window.
    SignatureExpire,
    /// The request signature does not match.
    SignatureFailure,
    /// The `HashedRequestPayload` does not match the request body.
    PayloadSigFailure,
    /// No `Nonce` query parameter was supplied.
    NonceNotFound,
    /// Reserved for authorization failures after authentication.
    StatusUnauthorized,
    /// The server failed to process the request.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric wire value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::InvalidParameter => 1,
            Self::SignatureNotFound => 2,
            Self::InvalidSecretId => 3,
            Self::SecretIdNotFound => 4,
            Self::SignatureExpire => 5,
            Self::SignatureFailure => 6,
            Self::PayloadSigFailure => 7,
            Self::NonceNotFound => 8,
            Self::StatusUnauthorized => 9,
            Self::InternalError => 10,
        }
    }

    /// Parse a numeric wire value.
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::InvalidParameter),
            2 => Some(Self::SignatureNotFound),
            3 => Some(Self::InvalidSecretId),
            4 => Some(Self::SecretIdNotFound),
            5 => Some(Self::SignatureExpire),
            6 => Some(Self::SignatureFailure),
            7 => Some(Self::PayloadSigFailure),
            8 => Some(Self::NonceNotFound),
            9 => Some(Self::StatusUnauthorized),
            10 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Returns the short error code name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InvalidParameter => "InvalidParameter",
            Self::SignatureNotFound => "SignatureNotFound",
            Self::InvalidSecretId => "InvalidSecretId",
            Self::SecretIdNotFound => "SecretIdNotFound",
            Self::SignatureExpire => "SignatureExpire",
            Self::SignatureFailure => "SignatureFailure",
            Self::PayloadSigFailure => "PayloadSigFailure",
            Self::NonceNotFound => "NonceNotFound",
            Self::StatusUnauthorized => "StatusUnauthorized",
            Self::InternalError => "InternalError",
        }
    }

    /// Returns the HTTP status used when this code is sent to a client.
    ///
    /// Protocol and application failures travel inside a `200 OK` envelope;
    /// only server-side faults change the status line.
    #[must_use]
    pub fn default_status_code(self) -> http::StatusCode {
        match self {
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::OK,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::from_i64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown error code: {value}")))
    }
}

/// An apisig error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The error code.
    pub code: ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new `ApiError` with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
        }
    }

    /// Override the HTTP status code.
    #[must_use]
    pub fn with_status(mut self, status_code: http::StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Malformed application input.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidParameter, message)
    }

    /// Internal server error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, message)
    }

    /// No route matched the request.
    #[must_use]
    pub fn unknown_route(method: &http::Method, path: &str) -> Self {
        Self::with_message(
            ErrorCode::InvalidParameter,
            format!("no route for {method} {path}"),
        )
        .with_status(http::StatusCode::NOT_FOUND)
    }
}
