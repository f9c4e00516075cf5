//! apisig operations and their request/response shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// All routed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Liveness probe; not signature-protected.
    Ping,
    /// `GET /say-hello`, signed without a body.
    SayHello,
    /// `POST /do-something`, signed with a JSON body.
    DoSomething,
}

impl Operation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::SayHello => "SayHello",
            Self::DoSomething => "DoSomething",
        }
    }

    /// The HTTP method the operation is served on.
    #[must_use]
    pub fn method(&self) -> http::Method {
        match self {
            Self::Ping | Self::SayHello => http::Method::GET,
            Self::DoSomething => http::Method::POST,
        }
    }

    /// The request path the operation is served on.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Ping => "/ping",
            Self::SayHello => "/say-hello",
            Self::DoSomething => "/do-something",
        }
    }

    /// Whether requests for this operation must carry a valid signature.
    #[must_use]
    pub fn requires_signature(&self) -> bool {
        !matches!(self, Self::Ping)
    }

    /// Resolve an operation from a method and path.
    #[must_use]
    pub fn from_route(method: &http::Method, path: &str) -> Option<Self> {
        [Self::Ping, Self::SayHello, Self::DoSomething]
            .into_iter()
            .find(|op| op.method() == *method && op.path() == path)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of the unauthenticated `/ping` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    /// Always `"pong by webServer."`.
    pub message: String,
}

/// `Data` of a `SayHello` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SayHelloResponse {
    /// The greeting.
    #[serde(rename = "Response")]
    pub response: String,
}

/// Body of a `DoSomething` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoSomethingRequest {
    /// The action to perform; must be non-empty.
    #[serde(rename = "Action")]
    pub action: String,
}

/// `Data` of a `DoSomething` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoSomethingResponse {
    /// The action that was requested.
    #[serde(rename = "Action")]
    pub action: String,
    /// The outcome of the action.
    #[serde(rename = "Result")]
    pub result: String,
}
