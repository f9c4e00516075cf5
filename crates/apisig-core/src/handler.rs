//! Handler implementation bridging HTTP to the demo provider.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use apisig_http::body::ApiResponseBody;
use apisig_http::dispatch::{ApiHandler, RequestContext};
use apisig_http::response::{json_response, success_response};
use apisig_model::{ApiError, Operation};
use bytes::Bytes;

use crate::provider::{DemoProvider, INVALID_PARAM_MESSAGE};

/// Handler that bridges the HTTP layer to the [`DemoProvider`].
#[derive(Debug, Default)]
pub struct DemoHandler {
    provider: Arc<DemoProvider>,
}

impl DemoHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<DemoProvider>) -> Self {
        Self { provider }
    }
}

impl ApiHandler for DemoHandler {
    fn handle_operation(
        &self,
        op: Operation,
        ctx: RequestContext,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<ApiResponseBody>, ApiError>> + Send>>
    {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &ctx, &body) })
    }
}

/// Dispatch an operation to the matching provider method.
fn dispatch(
    provider: &DemoProvider,
    op: Operation,
    ctx: &RequestContext,
    body: &[u8],
) -> Result<http::Response<ApiResponseBody>, ApiError> {
    match op {
        Operation::Ping => {
            // The probe answers with a bare object, not an envelope.
            let json = serde_json::to_vec(&provider.ping()).map_err(|e| {
                ApiError::internal_error(format!("Failed to serialize response: {e}"))
            })?;
            Ok(json_response(json, http::StatusCode::OK, &ctx.request_id))
        }
        Operation::SayHello => success_response(provider.say_hello(), &ctx.request_id),
        Operation::DoSomething => {
            let input = deserialize(body)?;
            let output = provider.do_something(input)?;
            success_response(output, &ctx.request_id)
        }
    }
}

/// Deserialize a JSON request body into the input type.
fn deserialize<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Failed to deserialize request body");
        ApiError::invalid_parameter(INVALID_PARAM_MESSAGE)
    })
}
