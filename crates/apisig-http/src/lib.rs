//! HTTP service layer for apisig.
//!
//! This crate turns the signing protocol into a hyper service:
//!
//! - **Router**: Resolves the operation from the method and path
//! - **Handler trait**: Defines the boundary between HTTP and business logic
//! - **Service**: Hyper `Service` that verifies signatures before dispatch
//! - **Response helpers**: JSON envelope success/error formatting
//! - **Server**: Accept loop with graceful shutdown

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod server;
pub mod service;

pub use body::ApiResponseBody;
pub use dispatch::{ApiHandler, RequestContext};
pub use server::serve;
pub use service::ApiHttpService;
