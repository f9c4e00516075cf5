//! apisig response serialization.
//!
//! Protocol outcomes, success or rejection, are reported inside the JSON
//! envelope with HTTP 200. Only transport-level problems (unknown routes,
//! unreadable bodies) change the HTTP status.

use apisig_model::{ApiError, Envelope};
use serde::Serialize;

use crate::body::ApiResponseBody;

/// Content type for apisig JSON responses.
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Header echoing the per-request correlation identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build a JSON response with the given status.
#[must_use]
pub fn json_response(
    json: Vec<u8>,
    status: http::StatusCode,
    request_id: &str,
) -> http::Response<ApiResponseBody> {
    let mut response = http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE)
        .body(ApiResponseBody::from_bytes(json))
        .expect("valid JSON response");

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, hv);
    }

    response
}

/// Wrap a payload in a success envelope.
///
/// # Errors
///
/// Returns an internal [`ApiError`] if the payload cannot be serialized.
pub fn success_response<T: Serialize>(
    data: T,
    request_id: &str,
) -> Result<http::Response<ApiResponseBody>, ApiError> {
    let json = serde_json::to_vec(&Envelope::success(data, request_id))
        .map_err(|e| ApiError::internal_error(format!("Failed to serialize response: {e}")))?;
    Ok(json_response(json, http::StatusCode::OK, request_id))
}

/// Serialize an error into a failure envelope.
///
/// ```json
/// { "Code": 6, "Message": "Signature verify failed", "Data": null, "RequestID": "..." }
/// ```
#[must_use]
pub fn error_to_json(error: &ApiError, request_id: &str) -> Vec<u8> {
    serde_json::to_vec(&Envelope::<()>::failure(error, request_id))
        .expect("JSON serialization of error cannot fail")
}

/// Convert an [`ApiError`] into a complete HTTP response.
#[must_use]
pub fn error_to_response(error: &ApiError, request_id: &str) -> http::Response<ApiResponseBody> {
    json_response(error_to_json(error, request_id), error.status_code, request_id)
}
