//! Server-side signature verification.
//!
//! [`Verifier::verify`] runs a fixed, linear sequence of checks and stops at
//! the first failure. Later checks rely on earlier ones having passed, so the
//! order is part of the contract:
//!
//! 1. `Signature` present, else [`AuthError::SignatureNotFound`]
//! 2. `Timestamp` present, numeric and within the allowed skew, else one of the
//!    `SignatureExpire` errors
//! 3. `SecretId` present, else [`AuthError::MissingSecretId`]
//! 4. `SecretId` resolvable in the [`SecretStore`], else [`AuthError::InvalidSecretId`]
//! 5. Resolve `SignatureMethod` (defaults to HMAC-SHA1)
//! 6. Resolve `Version` (defaults to the configured version, otherwise unchecked)
//! 7. If `HashedRequestPayload` is present, compare it against the body digest,
//!    else [`AuthError::PayloadSignatureMismatch`]; without it the body is not
//!    authenticated
//! 8. `Nonce` present, else [`AuthError::MissingNonce`]; it is not checked for reuse
//! 9. Recompute the signature over the recovered canonical string, else
//!    [`AuthError::SignatureDoesNotMatch`]
//!
//! Query values are read with form-urlencoded decoding; the first occurrence
//! of a name wins and an empty value counts as absent.

use std::sync::Arc;

use tracing::debug;

use crate::canonical::{DEFAULT_VERSION, param, recover_string_to_sign};
use crate::credentials::SecretStore;
use crate::error::AuthError;
use crate::mac::{SignatureMethod, codes_match, compute_code};

/// Default freshness window in seconds, applied in both directions.
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: u64 = 300;

/// Verifier settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Maximum allowed distance between `Timestamp` and the verifier's clock.
    pub max_clock_skew_secs: u64,
    /// Version assumed when the request carries none.
    pub default_version: String,
    /// Record request bodies in debug-level traces when digesting them.
    pub trace_payloads: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_clock_skew_secs: DEFAULT_MAX_CLOCK_SKEW_SECS,
            default_version: DEFAULT_VERSION.to_owned(),
            trace_payloads: false,
        }
    }
}

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// The `SecretId` that signed the request.
    pub secret_id: String,
    /// The protocol version (explicit or defaulted).
    pub version: String,
    /// The algorithm the request was verified with.
    pub signature_method: SignatureMethod,
    /// The request nonce.
    pub nonce: String,
    /// The request timestamp.
    pub timestamp: i64,
    /// Whether the body was authenticated through `HashedRequestPayload`.
    pub payload_verified: bool,
}

/// Verifies signed requests against a [`SecretStore`].
#[derive(Clone)]
pub struct Verifier {
    store: Arc<dyn SecretStore>,
    config: VerifierConfig,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("store", &"...")
            .field("config", &self.config)
            .finish()
    }
}

impl Verifier {
    /// Create a verifier backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, config: VerifierConfig) -> Self {
        Self { store, config }
    }

    /// The verifier settings.
    #[must_use]
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify a request against the current wall-clock time.
    ///
    /// `body` is the fully buffered request body; it is only read when the
    /// request carries `HashedRequestPayload`.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the first failing check.
    pub fn verify(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
    ) -> Result<VerifiedRequest, AuthError> {
        self.verify_at(parts, body, chrono::Utc::now().timestamp())
    }

    /// Verify a request against an explicit clock (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the first failing check.
    pub fn verify_at(
        &self,
        parts: &http::request::Parts,
        body: &[u8],
        now: i64,
    ) -> Result<VerifiedRequest, AuthError> {
        let query: Vec<(String, String)> = form_urlencoded::parse(
            parts.uri.query().unwrap_or("").as_bytes(),
        )
        .into_owned()
        .collect();

        // 1. Signature.
        let provided_signature =
            query_param(&query, param::SIGNATURE).ok_or(AuthError::SignatureNotFound)?;

        // 2. Timestamp freshness.
        let timestamp = self.check_timestamp(query_param(&query, param::TIMESTAMP), now)?;

        // 3. SecretId presence.
        let secret_id = query_param(&query, param::SECRET_ID).ok_or(AuthError::MissingSecretId)?;

        // 4. Secret lookup.
        let credential = self.store.lookup(secret_id).map_err(|err| {
            debug!(secret_id, error = %err, "Secret lookup failed");
            AuthError::InvalidSecretId(secret_id.to_owned())
        })?;
        let secret = credential.secret.as_bytes();

        // 5. Algorithm.
        let signature_method =
            SignatureMethod::resolve(query_param(&query, param::SIGNATURE_METHOD));

        // 6. Version.
        let version = query_param(&query, param::VERSION)
            .unwrap_or(self.config.default_version.as_str())
            .to_owned();

        debug!(
            secret_id,
            signature_method = %signature_method,
            version = %version,
            "Verifying request signature"
        );

        // 7. Body digest.
        let hashed_payload = query_param(&query, param::HASHED_REQUEST_PAYLOAD);
        if let Some(provided_digest) = hashed_payload {
            if self.config.trace_payloads {
                debug!(payload = %String::from_utf8_lossy(body), "Digesting request payload");
            }
            let expected_digest = compute_code(body, secret, signature_method);
            if !codes_match(provided_digest, &expected_digest) {
                debug!(
                    expected = %expected_digest,
                    provided = %provided_digest,
                    "Payload digest mismatch"
                );
                return Err(AuthError::PayloadSignatureMismatch);
            }
        }

        // 8. Nonce presence; reuse is not tracked.
        let nonce = query_param(&query, param::NONCE).ok_or(AuthError::MissingNonce)?;

        // 9. Outer signature over the verbatim request target.
        let string_to_sign = recover_string_to_sign(
            parts.method.as_str(),
            request_host(parts),
            request_target(parts),
        )?;

        debug!(string_to_sign = %string_to_sign, "Recovered string to sign");

        let expected_signature =
            compute_code(string_to_sign.as_bytes(), secret, signature_method);

        if !codes_match(provided_signature, &expected_signature) {
            debug!(
                expected = %expected_signature,
                provided = %provided_signature,
                "Signature mismatch"
            );
            return Err(AuthError::SignatureDoesNotMatch);
        }

        debug!(secret_id, "Signature verification succeeded");

        Ok(VerifiedRequest {
            secret_id: secret_id.to_owned(),
            version,
            signature_method,
            nonce: nonce.to_owned(),
            timestamp,
            payload_verified: hashed_payload.is_some(),
        })
    }

    /// Parse `Timestamp` and check it against the freshness window.
    fn check_timestamp(&self, value: Option<&str>, now: i64) -> Result<i64, AuthError> {
        let value = value.ok_or(AuthError::MissingTimestamp)?;
        let timestamp: i64 = value
            .parse()
            .map_err(|_| AuthError::InvalidTimestamp(value.to_owned()))?;

        if now.abs_diff(timestamp) > self.config.max_clock_skew_secs {
            debug!(timestamp, now, "Signature expired");
            return Err(AuthError::SignatureExpired { timestamp, now });
        }

        Ok(timestamp)
    }
}

/// First non-empty value of a decoded query parameter.
fn query_param<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// The host the client addressed: the `Host` header, else the URI authority.
fn request_host(parts: &http::request::Parts) -> &str {
    parts
        .headers
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| parts.uri.authority().map(http::uri::Authority::as_str))
        .unwrap_or("")
}

/// The verbatim request target (`path?query`).
fn request_target(parts: &http::request::Parts) -> &str {
    parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), http::uri::PathAndQuery::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{append_signature, build_string_to_sign};
    use crate::credentials::{Credential, StaticSecretStore};
    use crate::sign::{SignedRequest, Signer, SignerConfig};

    const NOW: i64 = 1_700_000_000;
    const HOST: &str = "localhost:7777";

    fn verifier() -> Verifier {
        let store = StaticSecretStore::new(vec![("ID1".to_owned(), "s3cr3t")]);
        Verifier::new(Arc::new(store), VerifierConfig::default())
    }

    fn signer(method: SignatureMethod) -> Signer {
        Signer::new(
            Credential {
                secret_id: "ID1".to_owned(),
                secret: "s3cr3t".into(),
            },
            SignerConfig {
                signature_method: method,
                ..SignerConfig::default()
            },
        )
    }

    fn parts(method: &http::Method, target: &str) -> http::request::Parts {
        http::Request::builder()
            .method(method.clone())
            .uri(target)
            .header("host", HOST)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn parts_for(signed: &SignedRequest) -> http::request::Parts {
        parts(&signed.method, &signed.path_and_query())
    }

    fn sign_get(timestamp: i64) -> SignedRequest {
        signer(SignatureMethod::HmacSha1)
            .sign(&http::Method::GET, HOST, "/say-hello", None, timestamp, "42")
            .unwrap()
    }

    fn sign_post(body: &[u8]) -> SignedRequest {
        signer(SignatureMethod::HmacSha256)
            .sign(&http::Method::POST, HOST, "/do-something", Some(body), NOW, "7")
            .unwrap()
    }

    #[test]
    fn test_should_accept_concrete_get_request() {
        let target = "/say-hello?Version=20191001&SecretId=ID1&Timestamp=1700000000&Nonce=42\
                      &Signature=gsqggcNq84BkPGgar49UzPbppGE%3D";
        let result = verifier().verify_at(&parts(&http::Method::GET, target), b"", NOW);

        let verified = result.unwrap();
        assert_eq!(verified.secret_id, "ID1");
        assert_eq!(verified.version, "20191001");
        assert_eq!(verified.signature_method, SignatureMethod::HmacSha1);
        assert_eq!(verified.nonce, "42");
        assert!(!verified.payload_verified);
    }

    #[test]
    fn test_should_round_trip_post_with_body_and_sha256() {
        let body = br#"{"Action":"ping"}"#;
        let signed = sign_post(body);
        let verified = verifier().verify_at(&parts_for(&signed), body, NOW).unwrap();
        assert_eq!(verified.signature_method, SignatureMethod::HmacSha256);
        assert!(verified.payload_verified);
    }

    #[test]
    fn test_should_fail_without_signature_before_anything_else() {
        let result = verifier().verify_at(&parts(&http::Method::GET, "/say-hello"), b"", NOW);
        assert_eq!(result, Err(AuthError::SignatureNotFound));
    }

    #[test]
    fn test_should_treat_empty_signature_as_missing() {
        let target = "/say-hello?Timestamp=1700000000&Signature=";
        let result = verifier().verify_at(&parts(&http::Method::GET, target), b"", NOW);
        assert_eq!(result, Err(AuthError::SignatureNotFound));
    }

    #[test]
    fn test_should_fail_on_missing_or_invalid_timestamp() {
        let result = verifier().verify_at(
            &parts(&http::Method::GET, "/p?SecretId=ID1&Signature=x"),
            b"",
            NOW,
        );
        assert_eq!(result, Err(AuthError::MissingTimestamp));

        let result = verifier().verify_at(
            &parts(&http::Method::GET, "/p?Timestamp=soon&Signature=x"),
            b"",
            NOW,
        );
        assert_eq!(result, Err(AuthError::InvalidTimestamp("soon".to_owned())));
    }

    #[test]
    fn test_should_accept_timestamps_at_the_window_edges() {
        for timestamp in [NOW - 300, NOW + 300] {
            let signed = sign_get(timestamp);
            let result = verifier().verify_at(&parts_for(&signed), b"", NOW);
            assert!(result.is_ok(), "timestamp {timestamp}: {result:?}");
        }
    }

    #[test]
    fn test_should_expire_timestamps_past_the_window_in_both_directions() {
        for timestamp in [NOW - 301, NOW + 301] {
            let signed = sign_get(timestamp);
            let err = verifier()
                .verify_at(&parts_for(&signed), b"", NOW)
                .unwrap_err();
            assert_eq!(err, AuthError::SignatureExpired { timestamp, now: NOW });
            assert_eq!(err.code(), apisig_model::ErrorCode::SignatureExpire);
        }
    }

    #[test]
    fn test_should_not_overflow_on_extreme_timestamps() {
        let target = format!("/p?Timestamp={}&Signature=x", i64::MIN);
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", i64::MAX);
        assert!(matches!(result, Err(AuthError::SignatureExpired { .. })));
    }

    #[test]
    fn test_should_fail_on_missing_secret_id() {
        let target = format!("/p?Timestamp={NOW}&Nonce=1&Signature=x");
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", NOW);
        assert_eq!(result, Err(AuthError::MissingSecretId));
    }

    #[test]
    fn test_should_fail_on_unknown_secret_id() {
        let target = format!("/p?SecretId=NOPE&Timestamp={NOW}&Nonce=1&Signature=x");
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", NOW);
        assert_eq!(result, Err(AuthError::InvalidSecretId("NOPE".to_owned())));
    }

    #[test]
    fn test_should_default_unrecognized_method_to_sha1() {
        let query = format!(
            "Version=20191001&SecretId=ID1&Timestamp={NOW}&Nonce=1&SignatureMethod=HmacSHA512"
        );
        let sts = build_string_to_sign("GET", HOST, "/say-hello", &query);
        let signature = compute_code(sts.as_bytes(), b"s3cr3t", SignatureMethod::HmacSha1);
        let target = format!("/say-hello?{}", append_signature(&query, &signature));

        let verified = verifier()
            .verify_at(&parts(&http::Method::GET, &target), b"", NOW)
            .unwrap();
        assert_eq!(verified.signature_method, SignatureMethod::HmacSha1);
    }

    #[test]
    fn test_should_select_sha256_case_insensitively() {
        let query = format!("SecretId=ID1&Timestamp={NOW}&Nonce=1&SignatureMethod=hmacsha256");
        let sts = build_string_to_sign("GET", HOST, "/say-hello", &query);
        let signature = compute_code(sts.as_bytes(), b"s3cr3t", SignatureMethod::HmacSha256);
        let target = format!("/say-hello?{}", append_signature(&query, &signature));

        let verified = verifier()
            .verify_at(&parts(&http::Method::GET, &target), b"", NOW)
            .unwrap();
        assert_eq!(verified.signature_method, SignatureMethod::HmacSha256);
        assert_eq!(verified.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_should_detect_body_tampering_with_payload_failure() {
        let signed = sign_post(br#"{"Action":"ping"}"#);
        let result = verifier().verify_at(&parts_for(&signed), br#"{"Action":"pong"}"#, NOW);
        assert_eq!(result, Err(AuthError::PayloadSignatureMismatch));
    }

    #[test]
    fn test_should_detect_replaced_payload_digest_with_signature_failure() {
        let original = br#"{"Action":"ping"}"#;
        let forged = br#"{"Action":"pong"}"#;
        let signed = sign_post(original);

        let original_digest = signed.hashed_payload.clone().unwrap();
        let forged_digest = compute_code(forged, b"s3cr3t", SignatureMethod::HmacSha256);
        let target = signed.path_and_query().replace(
            &crate::canonical::query_escape(&original_digest),
            &crate::canonical::query_escape(&forged_digest),
        );

        let result = verifier().verify_at(&parts(&http::Method::POST, &target), forged, NOW);
        assert_eq!(result, Err(AuthError::SignatureDoesNotMatch));
    }

    #[test]
    fn test_should_not_authenticate_body_without_payload_digest() {
        let signed = sign_get(NOW);
        let result = verifier().verify_at(&parts_for(&signed), b"anything", NOW);
        assert!(result.is_ok());
    }

    #[test]
    fn test_should_check_payload_before_nonce() {
        let target = format!(
            "/p?SecretId=ID1&Timestamp={NOW}&HashedRequestPayload=bogus&Signature=x"
        );
        let result = verifier().verify_at(&parts(&http::Method::POST, &target), b"{}", NOW);
        assert_eq!(result, Err(AuthError::PayloadSignatureMismatch));
    }

    #[test]
    fn test_should_fail_on_missing_nonce() {
        let target = format!("/p?SecretId=ID1&Timestamp={NOW}&Signature=x");
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", NOW);
        assert_eq!(result, Err(AuthError::MissingNonce));
    }

    #[test]
    fn test_should_ignore_parameters_appended_after_signature() {
        let signed = sign_get(NOW);
        let target = format!("{}&Extra=1", signed.path_and_query());
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", NOW);
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_should_reject_parameters_inserted_before_signature() {
        let signed = sign_get(NOW);
        let target = signed
            .path_and_query()
            .replace("&Signature=", "&Extra=1&Signature=");
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", NOW);
        assert_eq!(result, Err(AuthError::SignatureDoesNotMatch));
    }

    #[test]
    fn test_should_reject_wrong_secret() {
        let store = StaticSecretStore::new(vec![("ID1".to_owned(), "other")]);
        let verifier = Verifier::new(Arc::new(store), VerifierConfig::default());
        let signed = sign_get(NOW);
        let result = verifier.verify_at(&parts_for(&signed), b"", NOW);
        assert_eq!(result, Err(AuthError::SignatureDoesNotMatch));
    }

    #[test]
    fn test_should_reject_signature_without_literal_marker() {
        let signed = sign_get(NOW);
        let target = signed.path_and_query().replace("Signature=", "Signatur%65=");
        let result = verifier().verify_at(&parts(&http::Method::GET, &target), b"", NOW);
        assert_eq!(result, Err(AuthError::SignatureNotFound));
    }

    #[test]
    fn test_should_sign_over_the_host_header() {
        let signed = sign_get(NOW);
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri(signed.path_and_query())
            .header("host", "evil.example:7777")
            .body(())
            .unwrap()
            .into_parts();
        let result = verifier().verify_at(&parts, b"", NOW);
        assert_eq!(result, Err(AuthError::SignatureDoesNotMatch));
    }

    #[test]
    fn test_should_fall_back_to_uri_authority_for_host() {
        let signed = sign_get(NOW);
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri(signed.url("http"))
            .body(())
            .unwrap()
            .into_parts();
        let result = verifier().verify_at(&parts, b"", NOW);
        assert!(result.is_ok(), "{result:?}");
    }
}
