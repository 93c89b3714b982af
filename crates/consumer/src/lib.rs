//! # Coeus Consumer
//!
//! Kafka consumer feeding appointment requests into the [`AppointmentWorkflow`].
//!
//! Responsibilities:
//! - Subscribe to the appointment topic with manual offset commits.
//! - Process one message at a time and commit its offset only after the workflow succeeds.
//!
//! Notes:
//! - A processing failure stops the consumer with [`ConsumerError::Processing`]; the offset is
//!   not committed, so the message is redelivered after restart.
//! - Messages from other topics are ignored.

use coeus_core::{AppointmentWorkflow, CoreError, CoreResult, KafkaConfig};
use coeus_core::constants::KAFKA_CLIENT_ID;
use fhir::AppointmentResponse;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("failed to process message {topic}[{partition}]@{offset}: {source}")]
    Processing {
        topic: String,
        partition: i32,
        offset: i64,
        #[source]
        source: CoreError,
    },
}

/// Build the librdkafka client configuration.
///
/// SASL_SSL with the PLAIN mechanism is enabled when both username and password are set.
pub fn client_config(kafka: &KafkaConfig) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", &kafka.bootstrap_servers)
        .set("group.id", &kafka.group_id)
        .set("client.id", KAFKA_CLIENT_ID)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest");

    if let Some((username, password)) = kafka.sasl_credentials() {
        config
            .set("security.protocol", "SASL_SSL")
            .set("sasl.mechanism", "PLAIN")
            .set("sasl.username", username)
            .set("sasl.password", password);
    }

    config
}

/// Route one message to the workflow.
///
/// # Returns
///
/// `Ok(None)` for messages on other topics, otherwise the published response.
///
/// # Errors
///
/// Returns [`CoreError::MissingField`] for an empty payload, and any workflow error.
pub async fn dispatch(
    workflow: &AppointmentWorkflow,
    appointment_topic: &str,
    topic: &str,
    payload: Option<&[u8]>,
) -> CoreResult<Option<AppointmentResponse>> {
    if topic != appointment_topic {
        tracing::debug!(%topic, "ignoring message from unhandled topic");
        return Ok(None);
    }

    let payload = payload.ok_or_else(|| CoreError::MissingField("message payload".into()))?;
    tracing::info!("received a request to schedule an appointment");
    workflow.handle_payload(payload).await.map(Some)
}

/// Appointment topic consumer.
pub struct AppointmentConsumer {
    consumer: StreamConsumer,
    topic: String,
    workflow: AppointmentWorkflow,
}

impl AppointmentConsumer {
    /// Create the consumer. Does not contact the broker until [`AppointmentConsumer::run`].
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Kafka`] if the client configuration is rejected.
    pub fn new(kafka: &KafkaConfig, workflow: AppointmentWorkflow) -> Result<Self, ConsumerError> {
        let consumer: StreamConsumer = client_config(kafka).create()?;
        Ok(Self {
            consumer,
            topic: kafka.topic.clone(),
            workflow,
        })
    }

    /// Consume until `shutdown` is cancelled or a message fails.
    ///
    /// Cancellation is observed between messages; an in-flight message is always finished.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Kafka`] on broker errors and [`ConsumerError::Processing`] when
    /// the workflow fails for a message.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ConsumerError> {
        self.consumer.subscribe(&[self.topic.as_str()])?;
        tracing::info!("consumer listening for topic '{}'", self.topic);

        loop {
            let (topic, partition, offset, payload) = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("consumer stopped");
                    return Ok(());
                }
                received = self.consumer.recv() => {
                    let message = received?;
                    (
                        message.topic().to_string(),
                        message.partition(),
                        message.offset(),
                        message.payload().map(<[u8]>::to_vec),
                    )
                }
            };

            if let Err(source) = dispatch(&self.workflow, &self.topic, &topic, payload.as_deref()).await {
                tracing::error!(%topic, partition, offset, "error processing message: {source}");
                return Err(ConsumerError::Processing {
                    topic,
                    partition,
                    offset,
                    source,
                });
            }

            let mut committed = TopicPartitionList::new();
            committed.add_partition_offset(&topic, partition, Offset::Offset(offset + 1))?;
            self.consumer.commit(&committed, CommitMode::Async)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coeus_core::{build_http_client, FhirServerConfig, ResourceClient};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOPIC: &str = "fhirsvr_appointment";

    fn kafka(username: Option<&str>, password: Option<&str>) -> KafkaConfig {
        KafkaConfig {
            bootstrap_servers: "broker:9092".into(),
            topic: TOPIC.into(),
            group_id: "coeus".into(),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    fn workflow_for(base: &str) -> AppointmentWorkflow {
        let http = build_http_client(Duration::from_secs(2)).expect("http client");
        let resources = ResourceClient::new(
            http.clone(),
            &FhirServerConfig {
                url: base.to_string(),
                base_path: "/fhir".into(),
            },
        );
        AppointmentWorkflow::new(resources, http, format!("{base}/responses"))
    }

    #[test]
    fn plain_config_without_credentials() {
        let config = client_config(&kafka(None, None));
        assert_eq!(config.get("bootstrap.servers"), Some("broker:9092"));
        assert_eq!(config.get("group.id"), Some("coeus"));
        assert_eq!(config.get("enable.auto.commit"), Some("false"));
        assert_eq!(config.get("security.protocol"), None);
    }

    #[test]
    fn sasl_enabled_with_credentials() {
        let config = client_config(&kafka(Some("user"), Some("pass")));
        assert_eq!(config.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(config.get("sasl.mechanism"), Some("PLAIN"));
        assert_eq!(config.get("sasl.username"), Some("user"));

        let half = client_config(&kafka(Some("user"), None));
        assert_eq!(half.get("security.protocol"), None);
    }

    #[tokio::test]
    async fn other_topics_are_ignored() {
        let workflow = workflow_for("http://127.0.0.1:9");
        let handled = dispatch(&workflow, TOPIC, "some_other_topic", Some(b"{}"))
            .await
            .expect("ignored");
        assert!(handled.is_none());
    }

    #[tokio::test]
    async fn empty_payload_is_missing_field() {
        let workflow = workflow_for("http://127.0.0.1:9");
        let err = dispatch(&workflow, TOPIC, TOPIC, None)
            .await
            .expect_err("no payload");
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "message payload"));
    }

    #[tokio::test]
    async fn malformed_payload_fails() {
        let workflow = workflow_for("http://127.0.0.1:9");
        let err = dispatch(&workflow, TOPIC, TOPIC, Some(b"not json"))
            .await
            .expect_err("bad payload");
        assert!(matches!(err, CoreError::Fhir(_)));
    }

    #[tokio::test]
    async fn appointment_topic_runs_workflow() {
        let server = MockServer::start().await;
        for (kind, id) in [("Patient", "pa-1"), ("Practitioner", "pr-1"), ("Location", "lo-1")] {
            Mock::given(method("GET"))
                .and(path(format!("/fhir/{kind}/{id}")))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!({"resourceType": kind, "id": id})),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let payload = serde_json::to_vec(&json!({
            "resourceType": "Appointment",
            "identifier": [{"value": "appt-1"}],
            "start": "2026-10-20T13:00:00Z",
            "end": "2026-10-20T13:30:00Z",
            "participant": [
                {"actor": {"type": "Patient", "identifier": {"value": "pa-1"}}},
                {"actor": {"type": "Practitioner", "identifier": {"value": "pr-1"}}},
                {"actor": {"type": "Location", "identifier": {"value": "lo-1"}}}
            ]
        }))
        .expect("encode");

        let workflow = workflow_for(&server.uri());
        let response = dispatch(&workflow, TOPIC, TOPIC, Some(&payload))
            .await
            .expect("handled")
            .expect("response");
        assert_eq!(response.appointment.identifier_value(), Some("appt-1"));
    }
}
