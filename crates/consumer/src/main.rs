//! Standalone appointment consumer binary.
//!
//! ## Purpose
//! Runs the appointment consumer and, when OAuth is configured, the token refresher, without the
//! HTTP API.
//!
//! ## Intended use
//! Scaling the consumer separately from the API. The workspace's main `coeus-run` binary runs
//! everything in one process.

use coeus_consumer::AppointmentConsumer;
use coeus_core::{
    build_http_client, cancel_on_exit, wait_for_signal, AppointmentWorkflow, CalendarClient,
    Config, ResourceClient, TokenHolder, TokenRefresher,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coeus_consumer=info".parse()?)
                .add_directive("coeus_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let http = build_http_client(config.http_timeout)?;
    let resources = ResourceClient::new(http.clone(), &config.fhir);
    let shutdown = CancellationToken::new();

    let mut workflow =
        AppointmentWorkflow::new(resources, http.clone(), config.connector.response_url());
    if let Some(oauth) = config.oauth.clone() {
        let holder = TokenHolder::new(oauth.initial_refresh_token.clone());
        let refresher = TokenRefresher::new(http.clone(), oauth, holder.clone());
        tokio::spawn(refresher.run(config.token_refresh_interval, shutdown.clone()));
        workflow = workflow.with_calendar(CalendarClient::new(
            http,
            config.calendar_events_url.clone(),
            holder,
        ));
    } else {
        tracing::info!("OAuth not configured; calendar events disabled");
    }

    let consumer = AppointmentConsumer::new(&config.kafka, workflow)?;

    tokio::spawn(wait_for_signal(shutdown.clone()));

    cancel_on_exit(shutdown.clone(), consumer.run(shutdown.clone())).await?;
    Ok(())
}
