//! Demo business logic behind the signed endpoints.

use apisig_model::ApiError;
use apisig_model::operations::{
    DoSomethingRequest, DoSomethingResponse, PingResponse, SayHelloResponse,
};
use tracing::debug;

/// Body returned by the unauthenticated liveness probe.
pub const PING_MESSAGE: &str = "pong by webServer.";

/// Greeting returned by `say-hello`.
pub const HELLO_MESSAGE: &str = "Hello World!";

/// Message reported for malformed `do-something` requests.
pub const INVALID_PARAM_MESSAGE: &str = "invalid param";

/// The demo provider. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoProvider;

impl DemoProvider {
    /// Create a new provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Handle the liveness probe.
    #[must_use]
    pub fn ping(&self) -> PingResponse {
        PingResponse {
            message: PING_MESSAGE.to_owned(),
        }
    }

    /// Handle `GET /say-hello`.
    #[must_use]
    pub fn say_hello(&self) -> SayHelloResponse {
        SayHelloResponse {
            response: HELLO_MESSAGE.to_owned(),
        }
    }

    /// Handle `POST /do-something`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidParameter` error if `Action` is empty.
    pub fn do_something(&self, input: DoSomethingRequest) -> Result<DoSomethingResponse, ApiError> {
        if input.action.is_empty() {
            return Err(ApiError::invalid_parameter(INVALID_PARAM_MESSAGE));
        }

        debug!(action = %input.action, "Handling DoSomething");

        let result = if input.action == "ping" {
            "pong".to_owned()
        } else {
            format!("Unknown Action {}", input.action)
        };

        Ok(DoSomethingResponse {
            action: input.action,
            result,
        })
    }
}
