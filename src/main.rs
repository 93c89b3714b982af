use api_rest::{AppState, router};
use coeus_consumer::AppointmentConsumer;
use coeus_core::{
    AppointmentWorkflow, CalendarClient, Config, ResourceClient, TokenHolder, TokenRefresher,
    build_http_client, cancel_on_exit, wait_for_signal,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Coeus scheduling service
///
/// Runs three tasks in one process, sharing the configuration and one HTTP client:
/// - the REST API on `0.0.0.0:$PORT` (default 8080)
/// - the appointment consumer on `$KAFKA_TOPIC`
/// - the OAuth token refresher, when `TENANT_ID`, `CLIENT_ID`, `CLIENT_SECRET` and
///   `PROVIDER_REFRESH_TOKEN` are all set
///
/// Ctrl-C or SIGTERM cancels everything. A consumer failure also stops the API so the process
/// exits non-zero and the message is redelivered after restart; a server failure likewise stops
/// the consumer.
///
/// # Returns
/// * `Ok(())` - After a requested shutdown
/// * `Err(anyhow::Error)` - If startup fails, the server fails or a message cannot be processed
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coeus_run=info".parse()?)
                .add_directive("coeus_core=info".parse()?)
                .add_directive("coeus_consumer=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let http = build_http_client(config.http_timeout)?;
    let resources = ResourceClient::new(http.clone(), &config.fhir);
    let shutdown = CancellationToken::new();

    let mut workflow = AppointmentWorkflow::new(
        resources.clone(),
        http.clone(),
        config.connector.response_url(),
    );
    let refresher = match config.oauth.clone() {
        Some(oauth) => {
            let holder = TokenHolder::new(oauth.initial_refresh_token.clone());
            workflow = workflow.with_calendar(CalendarClient::new(
                http.clone(),
                config.calendar_events_url.clone(),
                holder.clone(),
            ));
            let refresher = TokenRefresher::new(http.clone(), oauth, holder);
            Some(tokio::spawn(
                refresher.run(config.token_refresh_interval, shutdown.clone()),
            ))
        }
        None => {
            tracing::info!("OAuth not configured; calendar events disabled");
            None
        }
    };

    let consumer = AppointmentConsumer::new(&config.kafka, workflow)?;

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("++ Starting Coeus REST on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server_shutdown = shutdown.clone();
    let rest_server = cancel_on_exit(
        shutdown.clone(),
        axum::serve(
            listener,
            router(AppState::new(resources, env!("CARGO_PKG_VERSION"))),
        )
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .into_future(),
    );
    let consumer_run = cancel_on_exit(shutdown.clone(), consumer.run(shutdown.clone()));

    let (rest_result, consumer_result) = tokio::join!(rest_server, consumer_run);
    if let Some(refresher) = refresher {
        refresher.await?;
    }
    rest_result?;
    consumer_result?;

    tracing::info!("-- Coeus stopped");
    Ok(())
}
