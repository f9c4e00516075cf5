//! Signing HTTP client.

use std::sync::Arc;
use std::time::Duration;

use apisig_auth::{NonceSource, Signer};
use apisig_model::operations::{
    DoSomethingRequest, DoSomethingResponse, Operation, PingResponse, SayHelloResponse,
};
use apisig_model::{ApiResponse, Envelope};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Content type for JSON request bodies.
const JSON_CONTENT_TYPE: &str = "application/json";

/// An HTTP client that signs every request with one pre-shared credential.
///
/// The signed host is the configured `endpoint_host`, which must be exactly
/// what the server sees in its `Host` header. A default port (80 for `http`)
/// is dropped from `Host` by the HTTP stack, so leave it out of
/// `endpoint_host` as well.
pub struct SignatureClient {
    signer: Signer,
    endpoint_host: String,
    scheme: String,
    nonces: Arc<dyn NonceSource>,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for SignatureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureClient")
            .field("secret_id", &self.signer.secret_id())
            .field("endpoint_host", &self.endpoint_host)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl SignatureClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the host or credential is empty, or
    /// the HTTP client cannot be built.
    pub fn new(config: ClientConfig, nonces: Arc<dyn NonceSource>) -> Result<Self, ClientError> {
        if config.endpoint_host.is_empty() {
            return Err(ClientError::Config("endpoint host must not be empty".to_owned()));
        }
        if config.secret_id.is_empty() || config.secret_key.is_empty() {
            return Err(ClientError::Config(
                "secret id and secret key must not be empty".to_owned(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            signer: Signer::new(config.credential(), config.signer_config()),
            endpoint_host: config.endpoint_host,
            scheme: config.scheme,
            nonces,
            http_client,
        })
    }

    /// Send a signed `GET` without a body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for signing, transport, status or decoding
    /// failures. Protocol rejections are returned as [`ApiResponse::Failure`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ClientError> {
        self.send(http::Method::GET, path, None).await
    }

    /// Send a signed `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`SignatureClient::get`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let json = serde_json::to_vec(body)
            .map_err(|e| ClientError::Decode(format!("Failed to serialize request: {e}")))?;
        self.send(http::Method::POST, path, Some(json)).await
    }

    /// Call the unauthenticated liveness probe.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] for transport, status or decoding failures.
    pub async fn ping(&self) -> Result<PingResponse, ClientError> {
        let url = format!(
            "{}://{}{}",
            self.scheme,
            self.endpoint_host,
            Operation::Ping.path()
        );
        let response = self.http_client.get(url).send().await?;
        let bytes = Self::checked_body(response).await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Call `GET /say-hello`.
    ///
    /// # Errors
    ///
    /// See [`SignatureClient::get`].
    pub async fn say_hello(&self) -> Result<ApiResponse<SayHelloResponse>, ClientError> {
        self.get(Operation::SayHello.path()).await
    }

    /// Call `POST /do-something`.
    ///
    /// # Errors
    ///
    /// See [`SignatureClient::get`].
    pub async fn do_something(
        &self,
        action: &str,
    ) -> Result<ApiResponse<DoSomethingResponse>, ClientError> {
        let request = DoSomethingRequest {
            action: action.to_owned(),
        };
        self.post_json(Operation::DoSomething.path(), &request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: http::Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse<T>, ClientError> {
        let nonce = self.nonces.next_nonce();
        let signed = self
            .signer
            .sign_now(&method, &self.endpoint_host, path, body.as_deref(), &nonce)?;
        let url = signed.url(&self.scheme);

        debug!(method = %method, url = %url, "Sending signed request");

        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request
                .header(http::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body);
        }

        let response = request.send().await?;
        let bytes = Self::checked_body(response).await?;

        let envelope: Envelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("invalid envelope: {e}")))?;

        debug!(
            request_id = %envelope.request_id,
            code = %envelope.code,
            "Received response"
        );

        envelope
            .into_response()
            .map_err(|e| ClientError::Decode(e.message))
    }

    /// Read the body of a 200 response, or fail with the status and body.
    async fn checked_body(response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
        let status = response.status();
        if status != http::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
