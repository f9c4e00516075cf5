//! Canonical string construction.
//!
//! The string that gets signed is:
//!
//! ```text
//! UPPER(Method) + Host + Path + "?" + CanonicalQuery
//! ```
//!
//! where `CanonicalQuery` lists the protocol parameters in a fixed order:
//!
//! ```text
//! Version=..&SecretId=..&Timestamp=..&Nonce=..[&SignatureMethod=..][&HashedRequestPayload=..]
//! ```
//!
//! `SignatureMethod` is present only when SHA-256 was requested and
//! `HashedRequestPayload` only when a body was sent. `Signature` is appended
//! after signing and is never part of the signed string.
//!
//! # Server-side recovery
//!
//! The verifier does **not** rebuild the canonical query from parsed
//! parameters. It takes the request target verbatim and cuts it right before
//! the first literal `Signature=` (dropping the separator in front of it), so
//! the signature only verifies if the query string arrived exactly as the
//! client serialized it. Parameters appended after `Signature` are ignored;
//! anything inserted before it breaks the signature. Rebuilding the query in
//! a "normalized" form here would make client and server disagree.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::AuthError;
use crate::mac::SignatureMethod;

/// Query parameter names reserved by the protocol.
pub mod param {
    /// Protocol version.
    pub const VERSION: &str = "Version";
    /// Public identifier of the shared secret.
    pub const SECRET_ID: &str = "SecretId";
    /// Decimal Unix seconds.
    pub const TIMESTAMP: &str = "Timestamp";
    /// Opaque per-request value.
    pub const NONCE: &str = "Nonce";
    /// Optional algorithm selector.
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    /// Optional body digest.
    pub const HASHED_REQUEST_PAYLOAD: &str = "HashedRequestPayload";
    /// The request signature; always last.
    pub const SIGNATURE: &str = "Signature";
}

/// The only protocol version currently defined.
pub const DEFAULT_VERSION: &str = "20191001";

/// The literal the verifier searches for in the request target.
const SIGNATURE_MARKER: &str = "Signature=";

/// Bytes left unescaped in query values: `A-Z a-z 0-9 - _ . ~`.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The protocol parameters that take part in the signed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParams {
    /// Protocol version.
    pub version: String,
    /// Public identifier of the shared secret.
    pub secret_id: String,
    /// Unix seconds at signing time.
    pub timestamp: i64,
    /// Per-request nonce.
    pub nonce: String,
    /// Algorithm used for both the payload digest and the signature.
    pub signature_method: SignatureMethod,
    /// Base64 payload digest, present only when a body is sent.
    pub hashed_payload: Option<String>,
}

/// Percent-encode a query value.
///
/// Unreserved bytes pass through, a space becomes `+` and every other byte
/// becomes `%XX` with uppercase hex digits.
///
/// # Examples
///
/// ```
/// use apisig_auth::canonical::query_escape;
///
/// assert_eq!(query_escape("a+b/c="), "a%2Bb%2Fc%3D");
/// assert_eq!(query_escape("hello world"), "hello+world");
/// assert_eq!(query_escape("x-y_z.~"), "x-y_z.~");
/// ```
#[must_use]
pub fn query_escape(value: &str) -> String {
    value
        .split(' ')
        .map(|part| utf8_percent_encode(part, QUERY_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Build the fixed-order canonical query string (without `Signature`).
///
/// # Examples
///
/// ```
/// use apisig_auth::canonical::{SignatureParams, build_canonical_query};
/// use apisig_auth::mac::SignatureMethod;
///
/// let query = build_canonical_query(&SignatureParams {
///     version: "20191001".to_owned(),
///     secret_id: "ID1".to_owned(),
///     timestamp: 1_700_000_000,
///     nonce: "42".to_owned(),
///     signature_method: SignatureMethod::HmacSha1,
///     hashed_payload: None,
/// });
/// assert_eq!(query, "Version=20191001&SecretId=ID1&Timestamp=1700000000&Nonce=42");
/// ```
#[must_use]
pub fn build_canonical_query(params: &SignatureParams) -> String {
    let mut pairs = vec![
        (param::VERSION, query_escape(&params.version)),
        (param::SECRET_ID, query_escape(&params.secret_id)),
        (param::TIMESTAMP, params.timestamp.to_string()),
        (param::NONCE, query_escape(&params.nonce)),
    ];

    if params.signature_method.is_explicit() {
        pairs.push((
            param::SIGNATURE_METHOD,
            query_escape(params.signature_method.as_str()),
        ));
    }

    if let Some(ref hashed) = params.hashed_payload {
        pairs.push((param::HASHED_REQUEST_PAYLOAD, query_escape(hashed)));
    }

    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string to sign from its components.
///
/// # Examples
///
/// ```
/// use apisig_auth::canonical::build_string_to_sign;
///
/// let sts = build_string_to_sign("get", "localhost:7777", "/say-hello", "Version=20191001");
/// assert_eq!(sts, "GETlocalhost:7777/say-hello?Version=20191001");
/// ```
#[must_use]
pub fn build_string_to_sign(method: &str, host: &str, path: &str, canonical_query: &str) -> String {
    format!(
        "{}{host}{path}?{canonical_query}",
        method.to_ascii_uppercase()
    )
}

/// Append the `Signature` parameter to a canonical query.
#[must_use]
pub fn append_signature(canonical_query: &str, signature: &str) -> String {
    format!(
        "{canonical_query}&{}={}",
        param::SIGNATURE,
        query_escape(signature)
    )
}

/// Recover the signed string from a raw inbound request.
///
/// Takes `UPPER(method) + host` followed by the verbatim request target up to,
/// but excluding, the separator before the first `Signature=`.
///
/// # Errors
///
/// Returns [`AuthError::SignatureNotFound`] if the request target contains no
/// `Signature=` literal.
///
/// # Examples
///
/// ```
/// use apisig_auth::canonical::recover_string_to_sign;
///
/// let sts = recover_string_to_sign(
///     "GET",
///     "localhost:7777",
///     "/say-hello?Version=20191001&Nonce=42&Signature=abc%3D&Extra=1",
/// )
/// .unwrap();
/// assert_eq!(sts, "GETlocalhost:7777/say-hello?Version=20191001&Nonce=42");
/// ```
pub fn recover_string_to_sign(
    method: &str,
    host: &str,
    request_target: &str,
) -> Result<String, AuthError> {
    let index = request_target
        .find(SIGNATURE_MARKER)
        .ok_or(AuthError::SignatureNotFound)?;

    let signed_target = request_target
        .get(..index.saturating_sub(1))
        .ok_or(AuthError::SignatureNotFound)?;

    Ok(format!(
        "{}{host}{signed_target}",
        method.to_ascii_uppercase()
    ))
}
