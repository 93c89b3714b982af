//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the HTTP API without a
//! broker connection. The workspace's main `coeus-run` binary runs the API, the appointment
//! consumer and the token refresher concurrently.

use api_rest::{router, AppState};
use coeus_core::{build_http_client, wait_for_signal, Config, ResourceClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Coeus REST API server
///
/// Listens on `0.0.0.0:$PORT` (default 8080) until Ctrl-C or SIGTERM.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the environment configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("coeus_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let http = build_http_client(config.http_timeout)?;
    let resources = ResourceClient::new(http, &config.fhir);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("-- Starting Coeus REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(AppState::new(resources, env!("CARGO_PKG_VERSION"))))
        .with_graceful_shutdown(wait_for_signal(CancellationToken::new()))
        .await?;

    Ok(())
}
