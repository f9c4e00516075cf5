//! HMAC query-string request signing and verification for apisig.
//!
//! Every signed request carries its authentication data in the query string.
//! The client signs `UPPER(method) + host + path + "?" + canonical query` with a
//! pre-shared secret (HMAC-SHA1 by default, HMAC-SHA256 on request) and appends
//! the base64 result as the final `Signature` parameter. A request body, when
//! present, is digested with the same algorithm into `HashedRequestPayload`,
//! which itself becomes part of the signed string.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use apisig_auth::credentials::{Credential, StaticSecretStore};
//! use apisig_auth::sign::{Signer, SignerConfig};
//! use apisig_auth::verify::{Verifier, VerifierConfig};
//!
//! let store = StaticSecretStore::new(vec![("ID1".to_owned(), "s3cr3t")]);
//! let verifier = Verifier::new(Arc::new(store), VerifierConfig::default());
//!
//! let signer = Signer::new(
//!     Credential { secret_id: "ID1".to_owned(), secret: "s3cr3t".into() },
//!     SignerConfig::default(),
//! );
//! let signed = signer
//!     .sign(&http::Method::GET, "localhost:7777", "/say-hello", None, 1_700_000_000, "42")
//!     .unwrap();
//!
//! let (parts, ()) = http::Request::get(signed.path_and_query())
//!     .header("host", "localhost:7777")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//! let verified = verifier.verify_at(&parts, b"", 1_700_000_000).unwrap();
//! assert_eq!(verified.secret_id, "ID1");
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical query and string-to-sign construction
//! - [`credentials`] - Secret store trait and in-memory implementation
//! - [`error`] - Verification error types
//! - [`mac`] - HMAC computation and constant-time comparison
//! - [`nonce`] - Nonce sources for outbound requests
//! - [`sign`] - Client-side signing
//! - [`verify`] - Server-side verification

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod mac;
pub mod nonce;
pub mod sign;
pub mod verify;

pub use credentials::{Credential, SecretKey, SecretStore, StaticSecretStore};
pub use error::AuthError;
pub use mac::SignatureMethod;
pub use nonce::{NonceSource, RandomNonceSource, SequenceNonceSource};
pub use sign::{SignError, SignedRequest, Signer, SignerConfig};
pub use verify::{VerifiedRequest, Verifier, VerifierConfig};
