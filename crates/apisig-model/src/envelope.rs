//! JSON response envelope.
//!
//! Every apisig response body, success or failure, has the same shape:
//!
//! ```json
//! {
//!   "Code": 0,
//!   "Message": "success",
//!   "Data": { "Response": "Hello World!" },
//!   "RequestID": "6f1c0b8e-3f7e-4b8e-9d43-2f6d3d6c2a11"
//! }
//! ```
//!
//! [`Envelope`] is the wire shape. Callers should convert it into an
//! [`ApiResponse`], which makes the success/failure split explicit and keeps
//! `Data` typed per endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ErrorCode};

/// Message used for every successful envelope.
pub const SUCCESS_MESSAGE: &str = "success";

/// The wire-level response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Result code; `0` on success.
    #[serde(rename = "Code")]
    pub code: ErrorCode,
    /// Human-readable message.
    #[serde(rename = "Message")]
    pub message: String,
    /// Endpoint-specific payload; `null` on failure.
    #[serde(rename = "Data")]
    pub data: Option<T>,
    /// Per-request correlation identifier.
    #[serde(rename = "RequestID")]
    pub request_id: String,
}

impl<T> Envelope<T> {
    /// Build a success envelope.
    #[must_use]
    pub fn success(data: T, request_id: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success,
            message: SUCCESS_MESSAGE.to_owned(),
            data: Some(data),
            request_id: request_id.into(),
        }
    }

    /// Build a failure envelope.
    #[must_use]
    pub fn failure(error: &ApiError, request_id: impl Into<String>) -> Self {
        Self {
            code: error.code,
            message: error.message.clone(),
            data: None,
            request_id: request_id.into(),
        }
    }

    /// Split the envelope into a typed [`ApiResponse`].
    ///
    /// # Errors
    ///
    /// Returns an `InternalError` [`ApiError`] when a success envelope
    /// carries no `Data`.
    pub fn into_response(self) -> Result<ApiResponse<T>, ApiError> {
        if self.code != ErrorCode::Success {
            return Ok(ApiResponse::Failure {
                request_id: self.request_id,
                error: ApiError::with_message(self.code, self.message),
            });
        }

        match self.data {
            Some(data) => Ok(ApiResponse::Success {
                request_id: self.request_id,
                data,
            }),
            None => Err(ApiError::internal_error(format!(
                "success envelope {} carries no Data",
                self.request_id
            ))),
        }
    }
}

/// A decoded response: either the endpoint's payload or a protocol error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// The request was accepted and handled.
    Success {
        /// Correlation identifier echoed by the server.
        request_id: String,
        /// The endpoint payload.
        data: T,
    },
    /// The request was rejected.
    Failure {
        /// Correlation identifier echoed by the server.
        request_id: String,
        /// The rejection code and message.
        error: ApiError,
    },
}

impl<T> ApiResponse<T> {
    /// The correlation identifier of the response.
    #[must_use]
    pub fn request_id(&self) -> &str {
        match self {
            Self::Success { request_id, .. } | Self::Failure { request_id, .. } => request_id,
        }
    }

    /// Convert into a `Result`, discarding the request id.
    ///
    /// # Errors
    ///
    /// Returns the carried [`ApiError`] for a failure response.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { error, .. } => Err(error),
        }
    }
}
