//! End-to-end tests for the apisig gateway.
//!
//! Every test starts its own gateway in-process on an ephemeral port and
//! talks to it over real TCP, either through [`SignatureClient`] or with raw
//! `reqwest` requests for cases the client refuses to produce.
//!
//! ```text
//! cargo test -p apisig-integration
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use apisig_auth::{Credential, SequenceNonceSource, SignatureMethod, Signer, SignerConfig, Verifier};
use apisig_client::{ClientConfig, SignatureClient};
use apisig_core::{DemoHandler, DemoProvider, ServerConfig};
use apisig_http::ApiHttpService;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// `SecretId` accepted by test servers.
pub const TEST_SECRET_ID: &str = "ID1";

/// Secret accepted by test servers.
pub const TEST_SECRET_KEY: &str = "s3cr3t";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A gateway running on a background task.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a gateway that accepts the test credential.
    pub async fn start() -> Self {
        let config = ServerConfig::builder()
            .gateway_listen("127.0.0.1:0".into())
            .secret_id(TEST_SECRET_ID.into())
            .secret_key(TEST_SECRET_KEY.into())
            .build();
        Self::start_with(&config).await
    }

    /// Start a gateway from an explicit configuration.
    pub async fn start_with(config: &ServerConfig) -> Self {
        init_tracing();

        let verifier = Verifier::new(Arc::new(config.secret_store()), config.verifier_config());
        let handler = DemoHandler::new(Arc::new(DemoProvider::new()));
        let service = ApiHttpService::new(Arc::new(handler), verifier);

        let listener = TcpListener::bind(config.listen_addr().expect("test listen address"))
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("test listener address");

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(apisig_http::serve(listener, service, async move {
            rx.await.ok();
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// The `host:port` clients must sign and connect to.
    #[must_use]
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    /// Absolute URL for a request target.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }

    /// A client signing with the test credential.
    #[must_use]
    pub fn client(&self, method: SignatureMethod) -> SignatureClient {
        self.client_with(TEST_SECRET_ID, TEST_SECRET_KEY, method)
    }

    /// A client signing with an arbitrary credential.
    #[must_use]
    pub fn client_with(
        &self,
        secret_id: &str,
        secret_key: &str,
        method: SignatureMethod,
    ) -> SignatureClient {
        let config = ClientConfig::builder()
            .endpoint_host(self.host())
            .secret_id(secret_id.to_owned())
            .secret_key(secret_key.to_owned())
            .signature_method(method)
            .build();
        SignatureClient::new(config, Arc::new(SequenceNonceSource::starting_at(1)))
            .expect("test client")
    }

    /// A signer for hand-built requests with the test credential.
    #[must_use]
    pub fn signer(&self, method: SignatureMethod) -> Signer {
        Signer::new(
            Credential {
                secret_id: TEST_SECRET_ID.to_owned(),
                secret: TEST_SECRET_KEY.into(),
            },
            SignerConfig {
                signature_method: method,
                ..SignerConfig::default()
            },
        )
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.expect("server task");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Parse a raw response body as JSON.
pub async fn json_body(response: reqwest::Response) -> serde_json::Value {
    let bytes = response.bytes().await.expect("response body");
    serde_json::from_slice(&bytes).expect("JSON response body")
}

mod test_rejection;
mod test_signed;
