//! Server configuration.
//!
//! Provides [`ServerConfig`] for configuring the apisig gateway. Values are
//! loaded from environment variables and fall back to defaults that match the
//! demo deployment (port 7777, the built-in demo credential).

use std::fmt;
use std::net::SocketAddr;

use apisig_auth::canonical::DEFAULT_VERSION;
use apisig_auth::credentials::{DEMO_SECRET_ID, DEMO_SECRET_KEY, StaticSecretStore};
use apisig_auth::verify::{DEFAULT_MAX_CLOCK_SKEW_SECS, VerifierConfig};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::CoreError;

/// Default bind address.
pub const DEFAULT_GATEWAY_LISTEN: &str = "0.0.0.0:7777";

/// Gateway configuration.
///
/// # Examples
///
/// ```
/// use apisig_core::config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:7777");
/// assert_eq!(config.max_clock_skew_secs, 300);
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Bind address for the gateway (e.g. `"0.0.0.0:7777"`).
    #[builder(default = String::from(DEFAULT_GATEWAY_LISTEN))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Allowed distance in seconds between a request `Timestamp` and the server clock.
    #[builder(default = DEFAULT_MAX_CLOCK_SKEW_SECS)]
    pub max_clock_skew_secs: u64,

    /// Version assumed for requests that do not send one.
    #[builder(default = String::from(DEFAULT_VERSION))]
    pub default_version: String,

    /// Record request bodies in debug traces.
    #[builder(default = false)]
    pub trace_payloads: bool,

    /// `SecretId` accepted by the gateway.
    #[builder(default = String::from(DEMO_SECRET_ID))]
    pub secret_id: String,

    /// Secret paired with `secret_id`.
    #[serde(skip_serializing, default)]
    #[builder(default = String::from(DEMO_SECRET_KEY))]
    pub secret_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from(DEFAULT_GATEWAY_LISTEN),
            log_level: String::from("info"),
            max_clock_skew_secs: DEFAULT_MAX_CLOCK_SKEW_SECS,
            default_version: String::from(DEFAULT_VERSION),
            trace_payloads: false,
            secret_id: String::from(DEMO_SECRET_ID),
            secret_key: String::from(DEMO_SECRET_KEY),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("gateway_listen", &self.gateway_listen)
            .field("log_level", &self.log_level)
            .field("max_clock_skew_secs", &self.max_clock_skew_secs)
            .field("default_version", &self.default_version)
            .field("trace_payloads", &self.trace_payloads)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:7777` |
    /// | `LOG_LEVEL` | `info` |
    /// | `SIGNATURE_MAX_SKEW_SECS` | `300` |
    /// | `SIGNATURE_DEFAULT_VERSION` | `20191001` |
    /// | `SIGNATURE_TRACE_PAYLOADS` | `false` |
    /// | `SECRET_ID` | demo credential |
    /// | `SECRET_KEY` | demo credential |
    ///
    /// # Examples
    ///
    /// ```
    /// use apisig_core::config::ServerConfig;
    ///
    /// let config = ServerConfig::from_env();
    /// assert!(!config.gateway_listen.is_empty());
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("SIGNATURE_MAX_SKEW_SECS") {
            if let Ok(n) = v.parse::<u64>() {
                config.max_clock_skew_secs = n;
            }
        }
        if let Some(v) = lookup("SIGNATURE_DEFAULT_VERSION") {
            config.default_version = v;
        }
        if let Some(v) = lookup("SIGNATURE_TRACE_PAYLOADS") {
            config.trace_payloads = parse_bool(&v);
        }
        if let Some(v) = lookup("SECRET_ID") {
            config.secret_id = v;
        }
        if let Some(v) = lookup("SECRET_KEY") {
            config.secret_key = v;
        }

        config
    }

    /// Parse the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidListenAddress`] if `gateway_listen` is not a
    /// socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, CoreError> {
        self.gateway_listen
            .parse()
            .map_err(|source| CoreError::InvalidListenAddress {
                addr: self.gateway_listen.clone(),
                source,
            })
    }

    /// Check that the configuration can be served.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] for an unparseable bind address or an empty
    /// credential.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.listen_addr()?;
        if self.secret_id.is_empty() {
            return Err(CoreError::MissingCredential("SECRET_ID"));
        }
        if self.secret_key.is_empty() {
            return Err(CoreError::MissingCredential("SECRET_KEY"));
        }
        if self.default_version.is_empty() {
            return Err(CoreError::InvalidValue {
                name: "SIGNATURE_DEFAULT_VERSION",
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Verifier settings derived from this configuration.
    #[must_use]
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            max_clock_skew_secs: self.max_clock_skew_secs,
            default_version: self.default_version.clone(),
            trace_payloads: self.trace_payloads,
        }
    }

    /// A secret store holding the configured credential.
    #[must_use]
    pub fn secret_store(&self) -> StaticSecretStore {
        StaticSecretStore::new(vec![(self.secret_id.clone(), self.secret_key.clone())])
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
