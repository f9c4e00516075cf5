//! apisig server - gateway for HMAC query-string signed requests.
//!
//! Serves `GET /ping` without authentication and `GET /say-hello` and
//! `POST /do-something` behind signature verification.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:7777 apisig-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:7777` | Bind address |
//! | `SIGNATURE_MAX_SKEW_SECS` | `300` | Accepted `Timestamp` drift |
//! | `SIGNATURE_DEFAULT_VERSION` | `20191001` | Version assumed when absent |
//! | `SIGNATURE_TRACE_PAYLOADS` | `false` | Log request bodies at debug level |
//! | `SECRET_ID` / `SECRET_KEY` | demo credential | Accepted credential |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result};
use apisig_auth::Verifier;
use apisig_core::{DemoHandler, DemoProvider, ServerConfig};
use apisig_http::ApiHttpService;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the HTTP service from the application [`ServerConfig`].
fn build_service(config: &ServerConfig) -> ApiHttpService<DemoHandler> {
    let verifier = Verifier::new(Arc::new(config.secret_store()), config.verifier_config());
    let handler = DemoHandler::new(Arc::new(DemoProvider::new()));
    ApiHttpService::new(Arc::new(handler), verifier)
}

/// Perform a health check by requesting the unauthenticated probe.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /ping HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("pong") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let config = ServerConfig::from_env();
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = ServerConfig::from_env();

    init_tracing(&config.log_level)?;

    config.validate().context("invalid server configuration")?;

    info!(
        gateway_listen = %config.gateway_listen,
        secret_id = %config.secret_id,
        max_clock_skew_secs = config.max_clock_skew_secs,
        default_version = %config.default_version,
        trace_payloads = config.trace_payloads,
        version = VERSION,
        "starting apisig server",
    );

    let service = build_service(&config);
    let addr = config.listen_addr()?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    apisig_http::serve(listener, service, shutdown).await;

    Ok(())
}
