//! Wire model types for the apisig request-signing protocol.
//!
//! This crate holds everything that client and server must agree on outside
//! of the signature itself: the numeric result codes, the JSON response
//! envelope and the per-endpoint request/response shapes.

pub mod envelope;
pub mod error;
pub mod operations;

pub use envelope::{ApiResponse, Envelope};
pub use error::{ApiError, ErrorCode};
pub use operations::Operation;
