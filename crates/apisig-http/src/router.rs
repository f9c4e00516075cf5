//! apisig request router.
//!
//! Routing is by exact method and path; the query string only carries
//! authentication parameters and never takes part in routing.

use apisig_model::{ApiError, Operation};

/// Resolve an operation from the request method and path.
///
/// # Errors
///
/// Returns a 404 [`ApiError`] if no operation is served at the route.
pub fn resolve_operation(method: &http::Method, path: &str) -> Result<Operation, ApiError> {
    Operation::from_route(method, path).ok_or_else(|| ApiError::unknown_route(method, path))
}
