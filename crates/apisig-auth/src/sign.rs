//! Client-side request signing.
//!
//! [`Signer`] turns a method, host, path and optional body into the query
//! string that the verifier accepts:
//!
//! 1. If a body is present, `HashedRequestPayload = Base64(HMAC(secret, body))`.
//! 2. Build the fixed-order canonical query and the string to sign.
//! 3. `Signature = Base64(HMAC(secret, string_to_sign))`.
//! 4. Append `&Signature=...` as the last parameter.
//!
//! The same algorithm is used for both digests, so tampering with the body
//! also invalidates the outer signature.

use tracing::debug;

use crate::canonical::{
    DEFAULT_VERSION, SignatureParams, append_signature, build_canonical_query,
    build_string_to_sign,
};
use crate::credentials::{Credential, SecretKey};
use crate::mac::{SignatureMethod, compute_code};

/// Errors raised before any signature is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    /// The target host is empty.
    #[error("host must not be empty")]
    EmptyHost,

    /// The path is not an absolute path without a query.
    #[error("invalid request path: {0}")]
    InvalidPath(String),
}

/// Signer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerConfig {
    /// Value of the `Version` parameter.
    pub version: String,
    /// Algorithm for the payload digest and the signature.
    pub signature_method: SignatureMethod,
    /// Record request bodies in debug-level traces.
    pub trace_payloads: bool,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_owned(),
            signature_method: SignatureMethod::default(),
            trace_payloads: false,
        }
    }
}

/// A request whose query string carries a valid signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: http::Method,
    /// Target host (with port, as sent in the `Host` header).
    pub host: String,
    /// Absolute request path.
    pub path: String,
    /// Full query string, `Signature` last.
    pub query: String,
    /// The exact string that was signed.
    pub string_to_sign: String,
    /// Base64 request signature.
    pub signature: String,
    /// Base64 body digest, when a body was signed.
    pub hashed_payload: Option<String>,
}

impl SignedRequest {
    /// The request target (`path?query`).
    #[must_use]
    pub fn path_and_query(&self) -> String {
        format!("{}?{}", self.path, self.query)
    }

    /// The absolute URL for the given scheme.
    #[must_use]
    pub fn url(&self, scheme: &str) -> String {
        format!("{scheme}://{}{}", self.host, self.path_and_query())
    }
}

/// Signs outbound requests with one pre-shared credential.
#[derive(Debug, Clone)]
pub struct Signer {
    secret_id: String,
    secret: SecretKey,
    config: SignerConfig,
}

impl Signer {
    /// Create a signer for the given credential.
    #[must_use]
    pub fn new(credential: Credential, config: SignerConfig) -> Self {
        Self {
            secret_id: credential.secret_id,
            secret: credential.secret,
            config,
        }
    }

    /// The `SecretId` this signer announces.
    #[must_use]
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// The signer settings.
    #[must_use]
    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Sign a request at the given Unix time with the given nonce.
    ///
    /// # Errors
    ///
    /// Returns [`SignError`] if the host is empty or the path is not an
    /// absolute path free of `?`.
    ///
    /// # Examples
    ///
    /// ```
    /// use apisig_auth::credentials::Credential;
    /// use apisig_auth::sign::{Signer, SignerConfig};
    ///
    /// let signer = Signer::new(
    ///     Credential { secret_id: "ID1".to_owned(), secret: "s3cr3t".into() },
    ///     SignerConfig::default(),
    /// );
    /// let signed = signer
    ///     .sign(&http::Method::GET, "localhost:7777", "/say-hello", None, 1_700_000_000, "42")
    ///     .unwrap();
    /// assert!(signed.query.ends_with("&Signature=gsqggcNq84BkPGgar49UzPbppGE%3D"));
    /// ```
    pub fn sign(
        &self,
        method: &http::Method,
        host: &str,
        path: &str,
        body: Option<&[u8]>,
        timestamp: i64,
        nonce: &str,
    ) -> Result<SignedRequest, SignError> {
        if host.is_empty() {
            return Err(SignError::EmptyHost);
        }
        if !path.starts_with('/') || path.contains('?') {
            return Err(SignError::InvalidPath(path.to_owned()));
        }

        let method_used = self.config.signature_method;
        let hashed_payload = body.map(|payload| {
            if self.config.trace_payloads {
                debug!(payload = %String::from_utf8_lossy(payload), "Signing request payload");
            }
            compute_code(payload, self.secret.as_bytes(), method_used)
        });

        let params = SignatureParams {
            version: self.config.version.clone(),
            secret_id: self.secret_id.clone(),
            timestamp,
            nonce: nonce.to_owned(),
            signature_method: method_used,
            hashed_payload: hashed_payload.clone(),
        };

        let canonical_query = build_canonical_query(&params);
        let string_to_sign = build_string_to_sign(method.as_str(), host, path, &canonical_query);

        debug!(string_to_sign = %string_to_sign, "Built string to sign");

        let signature = compute_code(string_to_sign.as_bytes(), self.secret.as_bytes(), method_used);
        let query = append_signature(&canonical_query, &signature);

        debug!(
            secret_id = %self.secret_id,
            signature_method = %method_used,
            signature = %signature,
            "Signed request"
        );

        Ok(SignedRequest {
            method: method.clone(),
            host: host.to_owned(),
            path: path.to_owned(),
            query,
            string_to_sign,
            signature,
            hashed_payload,
        })
    }

    /// Sign a request at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// See [`Signer::sign`].
    pub fn sign_now(
        &self,
        method: &http::Method,
        host: &str,
        path: &str,
        body: Option<&[u8]>,
        nonce: &str,
    ) -> Result<SignedRequest, SignError> {
        let now = chrono::Utc::now().timestamp();
        self.sign(method, host, path, body, now, nonce)
    }
}
