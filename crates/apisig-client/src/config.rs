//! Client configuration.

use std::fmt;

use apisig_auth::canonical::DEFAULT_VERSION;
use apisig_auth::credentials::{DEMO_SECRET_ID, DEMO_SECRET_KEY};
use apisig_auth::{Credential, SignatureMethod, SignerConfig};
use typed_builder::TypedBuilder;

/// Default gateway address.
pub const DEFAULT_ENDPOINT_HOST: &str = "localhost:7777";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`SignatureClient`](crate::SignatureClient).
///
/// # Examples
///
/// ```
/// use apisig_auth::SignatureMethod;
/// use apisig_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint_host("127.0.0.1:7777".into())
///     .signature_method(SignatureMethod::HmacSha256)
///     .build();
/// assert_eq!(config.scheme, "http");
/// ```
#[derive(Clone, TypedBuilder)]
pub struct ClientConfig {
    /// Gateway `host:port`; also the host that gets signed.
    #[builder(default = String::from(DEFAULT_ENDPOINT_HOST))]
    pub endpoint_host: String,

    /// URL scheme.
    #[builder(default = String::from("http"))]
    pub scheme: String,

    /// Public identifier of the shared secret.
    #[builder(default = String::from(DEMO_SECRET_ID))]
    pub secret_id: String,

    /// The shared secret.
    #[builder(default = String::from(DEMO_SECRET_KEY))]
    pub secret_key: String,

    /// Algorithm for the payload digest and the signature.
    #[builder(default)]
    pub signature_method: SignatureMethod,

    /// Value sent in `Version`.
    #[builder(default = String::from(DEFAULT_VERSION))]
    pub version: String,

    /// Per-request timeout in seconds.
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Record request bodies in debug traces.
    #[builder(default = false)]
    pub trace_payloads: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint_host", &self.endpoint_host)
            .field("scheme", &self.scheme)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .field("signature_method", &self.signature_method)
            .field("version", &self.version)
            .field("timeout_secs", &self.timeout_secs)
            .field("trace_payloads", &self.trace_payloads)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `APISIG_HOST` | `localhost:7777` |
    /// | `APISIG_SCHEME` | `http` |
    /// | `APISIG_SECRET_ID` | demo credential |
    /// | `APISIG_SECRET_KEY` | demo credential |
    /// | `APISIG_SIGNATURE_METHOD` | `HmacSHA1` |
    /// | `APISIG_VERSION` | `20191001` |
    /// | `APISIG_TIMEOUT_SECS` | `30` |
    /// | `APISIG_TRACE_PAYLOADS` | `false` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("APISIG_HOST") {
            config.endpoint_host = v;
        }
        if let Some(v) = lookup("APISIG_SCHEME") {
            config.scheme = v;
        }
        if let Some(v) = lookup("APISIG_SECRET_ID") {
            config.secret_id = v;
        }
        if let Some(v) = lookup("APISIG_SECRET_KEY") {
            config.secret_key = v;
        }
        if let Some(v) = lookup("APISIG_SIGNATURE_METHOD") {
            config.signature_method = SignatureMethod::resolve(Some(&v));
        }
        if let Some(v) = lookup("APISIG_VERSION") {
            config.version = v;
        }
        if let Some(v) = lookup("APISIG_TIMEOUT_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.timeout_secs = n;
            }
        }
        if let Some(v) = lookup("APISIG_TRACE_PAYLOADS") {
            config.trace_payloads = v == "1" || v.eq_ignore_ascii_case("true");
        }

        config
    }

    /// The credential used for signing.
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential {
            secret_id: self.secret_id.clone(),
            secret: self.secret_key.as_str().into(),
        }
    }

    /// Signer settings derived from this configuration.
    #[must_use]
    pub fn signer_config(&self) -> SignerConfig {
        SignerConfig {
            version: self.version.clone(),
            signature_method: self.signature_method,
            trace_payloads: self.trace_payloads,
        }
    }
}
