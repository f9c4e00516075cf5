//! apisig demo - calls the signed endpoints of a running apisig server.
//!
//! # Usage
//!
//! ```text
//! APISIG_SIGNATURE_METHOD=HmacSHA256 apisig-demo [action]
//! ```
//!
//! Sends `GET /say-hello` (signed without a body) and `POST /do-something`
//! with `{"Action": action}` (signed with a payload digest). `action`
//! defaults to `ping`. Client settings come from the `APISIG_*` variables
//! documented on [`ClientConfig::from_env`].

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{Context, Result};
use apisig_auth::RandomNonceSource;
use apisig_client::{ClientConfig, SignatureClient};
use apisig_model::ApiResponse;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber from `RUST_LOG`, defaulting to `warn`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
}

/// Print a decoded response the way a caller would inspect it.
fn report<T: Debug>(call: &str, response: &ApiResponse<T>) {
    println!("{call}: RequestID {}", response.request_id());
    match response {
        ApiResponse::Success { data, .. } => println!("{call}: {data:?}"),
        ApiResponse::Failure { error, .. } => {
            println!("{call}: Code {} Message {}", error.code.as_i64(), error.message);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let action = std::env::args().nth(1).unwrap_or_else(|| "ping".to_owned());
    let config = ClientConfig::from_env();

    info!(
        endpoint_host = %config.endpoint_host,
        signature_method = %config.signature_method,
        "starting apisig demo"
    );

    let client = SignatureClient::new(config, Arc::new(RandomNonceSource))
        .context("failed to create client")?;

    let hello = client.say_hello().await.context("say-hello failed")?;
    report("say-hello", &hello);

    let something = client
        .do_something(&action)
        .await
        .context("do-something failed")?;
    report("do-something", &something);

    Ok(())
}
