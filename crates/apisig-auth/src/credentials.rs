//! Secret store trait and implementations.
//!
//! This module defines the [`SecretStore`] trait for resolving shared secrets
//! from public `SecretId`s, along with a [`StaticSecretStore`] for tests and
//! single-tenant deployments.

use std::collections::HashMap;
use std::fmt;

use crate::error::AuthError;

/// `SecretId` of the built-in demo credential.
pub const DEMO_SECRET_ID: &str = "SKIDz8krbsJ5yKBZQpn74WFkmLPx3EXAMPLE";

/// Secret of the built-in demo credential.
pub const DEMO_SECRET_KEY: &str = "Gu5t9xGARNpq86cd98joQYCN3EXAMPLE";

/// A shared secret. Its `Debug` output never contains the key material.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw secret bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The raw key material.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SecretKey {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

/// A pre-shared credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Public identifier sent in the `SecretId` parameter.
    pub secret_id: String,
    /// The shared secret.
    pub secret: SecretKey,
}

/// Trait for looking up shared secrets by `SecretId`.
///
/// Implementations may back this with a database or any other store; the
/// lookup may block. It is called at most once per verified request and its
/// result is not cached by the verifier.
pub trait SecretStore: Send + Sync {
    /// Retrieve the credential for the given `SecretId`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidSecretId`] if the id is unknown or the
    /// backing store fails.
    fn lookup(&self, secret_id: &str) -> Result<Credential, AuthError>;
}

/// A simple in-memory secret store backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use apisig_auth::credentials::{SecretStore, StaticSecretStore};
///
/// let store = StaticSecretStore::new(vec![("ID1".to_owned(), "s3cr3t".to_owned())]);
/// let credential = store.lookup("ID1").unwrap();
/// assert_eq!(credential.secret.as_bytes(), b"s3cr3t");
/// ```
#[derive(Clone)]
pub struct StaticSecretStore {
    secrets: HashMap<String, SecretKey>,
}

impl StaticSecretStore {
    /// Create a store from an iterable of `(secret_id, secret)` pairs.
    pub fn new<K: Into<SecretKey>>(secrets: impl IntoIterator<Item = (String, K)>) -> Self {
        Self {
            secrets: secrets
                .into_iter()
                .map(|(id, secret)| (id, secret.into()))
                .collect(),
        }
    }

    /// Number of stored credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the store holds no credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl fmt::Debug for StaticSecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticSecretStore")
            .field("secret_ids", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SecretStore for StaticSecretStore {
    fn lookup(&self, secret_id: &str) -> Result<Credential, AuthError> {
        self.secrets
            .get(secret_id)
            .map(|secret| Credential {
                secret_id: secret_id.to_owned(),
                secret: secret.clone(),
            })
            .ok_or_else(|| AuthError::InvalidSecretId(secret_id.to_owned()))
    }
}
