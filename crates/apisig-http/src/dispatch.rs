//! apisig handler trait and operation dispatch.

use std::future::Future;
use std::pin::Pin;

use apisig_auth::VerifiedRequest;
use apisig_model::{ApiError, Operation};
use bytes::Bytes;

use crate::body::ApiResponseBody;

/// Per-request data handed to the handler alongside the body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation identifier for the response envelope.
    pub request_id: String,
    /// Who signed the request; `None` for unauthenticated operations.
    pub verified: Option<VerifiedRequest>,
}

/// Trait that the business logic provider must implement.
///
/// The handler receives the resolved operation, the request context and the
/// buffered body, and returns a complete HTTP response. This trait is the
/// boundary between the HTTP transport layer and the business logic layer.
pub trait ApiHandler: Send + Sync + 'static {
    /// Handle an operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: Operation,
        ctx: RequestContext,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<ApiResponseBody>, ApiError>> + Send>>;
}

/// Dispatch an operation to the handler.
pub async fn dispatch_operation<H: ApiHandler>(
    handler: &H,
    op: Operation,
    ctx: RequestContext,
    body: Bytes,
) -> Result<http::Response<ApiResponseBody>, ApiError> {
    tracing::debug!(operation = %op, request_id = %ctx.request_id, "dispatching apisig operation");
    handler.handle_operation(op, ctx, body).await
}
