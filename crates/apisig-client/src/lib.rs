//! Signing HTTP client for apisig endpoints.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use apisig_auth::RandomNonceSource;
//! use apisig_client::{ClientConfig, SignatureClient};
//!
//! # tokio_test::block_on(async {
//! let client = SignatureClient::new(ClientConfig::from_env(), Arc::new(RandomNonceSource))?;
//! let hello = client.say_hello().await?;
//! println!("{hello:?}");
//! # Ok::<(), apisig_client::ClientError>(())
//! # }).unwrap();
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::SignatureClient;
pub use config::ClientConfig;
pub use error::ClientError;
