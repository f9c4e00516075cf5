//! Core error type for gateway setup.

/// Errors raised while preparing the gateway from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The bind address is not a socket address.
    #[error("invalid listen address {addr}: {source}")]
    InvalidListenAddress {
        /// The configured address.
        addr: String,
        /// The parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// A credential component is empty.
    #[error("{0} must not be empty")]
    MissingCredential(&'static str),

    /// A setting has an unusable value.
    #[error("invalid {name}: {reason}")]
    InvalidValue {
        /// The environment variable name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
