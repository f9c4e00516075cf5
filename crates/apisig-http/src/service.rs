//! apisig HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use apisig_auth::Verifier;
use apisig_model::{ApiError, Operation};
use bytes::Bytes;
use http_body_util::BodyExt;
use tracing::{debug, warn};

use crate::body::ApiResponseBody;
use crate::dispatch::{ApiHandler, RequestContext, dispatch_operation};
use crate::response::{CONTENT_TYPE, REQUEST_ID_HEADER, error_to_response};
use crate::router::resolve_operation;

/// Hyper `Service` implementation for apisig.
///
/// Answers the liveness probe directly and puts every other request through
/// the signature [`Verifier`] before routing it to the [`ApiHandler`].
pub struct ApiHttpService<H: ApiHandler> {
    handler: Arc<H>,
    verifier: Arc<Verifier>,
}

impl<H: ApiHandler> ApiHttpService<H> {
    /// Create a new `ApiHttpService`.
    pub fn new(handler: Arc<H>, verifier: Verifier) -> Self {
        Self {
            handler,
            verifier: Arc::new(verifier),
        }
    }
}

impl<H: ApiHandler> fmt::Debug for ApiHttpService<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiHttpService")
            .field("verifier", &self.verifier)
            .finish_non_exhaustive()
    }
}

impl<H: ApiHandler> Clone for ApiHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

impl<H, B> hyper::service::Service<http::Request<B>> for ApiHttpService<H>
where
    H: ApiHandler,
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: fmt::Display,
{
    type Response = http::Response<ApiResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let verifier = Arc::clone(&self.verifier);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = process_request(req, handler.as_ref(), &verifier, &request_id).await;
            let response = add_common_headers(response, &request_id);
            Ok(response)
        })
    }
}

/// Process a single request through the full pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    verifier: &Verifier,
    request_id: &str,
) -> http::Response<ApiResponseBody>
where
    H: ApiHandler,
    B: http_body::Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    let (parts, incoming) = req.into_parts();
    let route = resolve_operation(&parts.method, parts.uri.path());

    // 1. The liveness probe skips verification.
    if matches!(route, Ok(Operation::Ping)) {
        let ctx = RequestContext {
            request_id: request_id.to_owned(),
            verified: None,
        };
        return match dispatch_operation(handler, Operation::Ping, ctx, Bytes::new()).await {
            Ok(response) => response,
            Err(err) => error_to_response(&err, request_id),
        };
    }

    // 2. Collect body once; the verifier and the handler share it.
    let body = match collect_body(incoming).await {
        Ok(body) => body,
        Err(err) => return error_to_response(&err, request_id),
    };

    // 3. Authenticate.
    let verified = match verifier.verify(&parts, &body) {
        Ok(verified) => verified,
        Err(auth_err) => {
            warn!(
                request_id,
                method = %parts.method,
                path = %parts.uri.path(),
                code = %auth_err.code(),
                error = %auth_err,
                "Rejected request"
            );
            return error_to_response(&ApiError::from(auth_err), request_id);
        }
    };

    debug!(
        request_id,
        secret_id = %verified.secret_id,
        nonce = %verified.nonce,
        "Request authenticated"
    );

    // 4. Route.
    let op = match route {
        Ok(op) => op,
        Err(err) => return error_to_response(&err, request_id),
    };

    // 5. Dispatch to handler.
    let ctx = RequestContext {
        request_id: request_id.to_owned(),
        verified: Some(verified),
    };
    match dispatch_operation(handler, op, ctx, body).await {
        Ok(response) => response,
        Err(err) => error_to_response(&err, request_id),
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body<B>(incoming: B) -> Result<Bytes, ApiError>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| ApiError::internal_error(format!("Failed to read request body: {e}")))
}

/// Add common response headers to every apisig response.
fn add_common_headers(
    mut response: http::Response<ApiResponseBody>,
    request_id: &str,
) -> http::Response<ApiResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry("content-type")
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static("apisig"));

    response
}
