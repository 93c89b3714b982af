//! Appointment auto-approval workflow.
//!
//! Responsibilities:
//! - Validate an incoming appointment request and resolve its patient, practitioner and location.
//! - Build an accepted `AppointmentResponse` and publish it to the downstream connector.
//! - Optionally mirror the appointment into the provider's calendar.
//!
//! Notes:
//! - The three resource reads run concurrently and fail fast; nothing is published if any fails.
//! - Calendar failures are logged and never block publication.
//! - Each invocation generates a new response identifier, so redelivered events produce distinct
//!   responses.

use crate::calendar::{CalendarClient, CalendarEvent};
use crate::client::{success_body, ResourceClient};
use crate::{CoreError, CoreResult};
use fhir::{ActorType, Appointment, AppointmentResponse, Location, Patient, Practitioner, Reference};

/// Handles appointment requests end to end.
#[derive(Clone, Debug)]
pub struct AppointmentWorkflow {
    resources: ResourceClient,
    http: reqwest::Client,
    response_url: String,
    calendar: Option<CalendarClient>,
}

impl AppointmentWorkflow {
    /// Create a workflow publishing responses to `response_url`, without calendar integration.
    pub fn new(resources: ResourceClient, http: reqwest::Client, response_url: impl Into<String>) -> Self {
        Self {
            resources,
            http,
            response_url: response_url.into(),
            calendar: None,
        }
    }

    /// Enable calendar event creation.
    pub fn with_calendar(mut self, calendar: CalendarClient) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Decode a raw event payload and handle it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Fhir`] if the payload is not an appointment, otherwise as
    /// [`AppointmentWorkflow::handle`].
    pub async fn handle_payload(&self, payload: &[u8]) -> CoreResult<AppointmentResponse> {
        let appointment = Appointment::from_json(payload)?;
        self.handle(&appointment).await
    }

    /// Approve an appointment request and publish the response.
    ///
    /// # Arguments
    ///
    /// * `appointment` - The decoded appointment request.
    ///
    /// # Returns
    ///
    /// The response that was published to the connector.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingField`] if `start`, `end`, `identifier`, `participant` or an actor's
    ///   identifier is absent.
    /// - [`CoreError::NotFound`] if no participant of a required actor type exists.
    /// - A transport or decode error if a resource read or the connector POST fails.
    pub async fn handle(&self, appointment: &Appointment) -> CoreResult<AppointmentResponse> {
        let start = appointment
            .start
            .clone()
            .ok_or_else(|| CoreError::MissingField("start".into()))?;
        let end = appointment
            .end
            .clone()
            .ok_or_else(|| CoreError::MissingField("end".into()))?;
        let identifier = appointment.primary_identifier()?.clone();

        let patient_ref = required_actor(appointment, ActorType::Patient)?;
        let practitioner_ref = required_actor(appointment, ActorType::Practitioner)?;
        let location_ref = required_actor(appointment, ActorType::Location)?;

        let patient_id = actor_id(patient_ref, ActorType::Patient)?;
        let practitioner_id = actor_id(practitioner_ref, ActorType::Practitioner)?;
        let location_id = actor_id(location_ref, ActorType::Location)?;

        tracing::info!(
            appointment = identifier.value.as_deref().unwrap_or_default(),
            patient = patient_id,
            practitioner = practitioner_id,
            location = location_id,
            "processing appointment request"
        );

        let (patient, practitioner, location) = tokio::try_join!(
            self.resources.read::<Patient>(patient_id),
            self.resources.read::<Practitioner>(practitioner_id),
            self.resources.read::<Location>(location_id),
        )?;

        let response =
            AppointmentResponse::accept(identifier, Some(start), Some(end), location_ref.clone());

        if let Some(calendar) = &self.calendar {
            let event = CalendarEvent::for_appointment(appointment, &patient, &practitioner, &location);
            match calendar.create_event(&event).await {
                Ok(()) => tracing::info!("calendar event created"),
                Err(CoreError::TokenUnavailable) => {
                    tracing::warn!("calendar event skipped: no access token yet")
                }
                Err(e) => tracing::error!("calendar event failed: {e}"),
            }
        }

        self.publish(&response).await?;
        tracing::info!(
            response = response.response_id().unwrap_or_default(),
            "appointment response published"
        );

        Ok(response)
    }

    async fn publish(&self, response: &AppointmentResponse) -> CoreResult<()> {
        let reply = self
            .http
            .post(&self.response_url)
            .json(response)
            .send()
            .await?;
        success_body(reply).await?;
        Ok(())
    }
}

fn required_actor(appointment: &Appointment, kind: ActorType) -> CoreResult<&Reference> {
    appointment
        .actor(kind)?
        .ok_or_else(|| CoreError::NotFound(format!("{kind} participant")))
}

fn actor_id(actor: &Reference, kind: ActorType) -> CoreResult<&str> {
    actor
        .identifier_value()
        .ok_or_else(|| CoreError::MissingField(format!("{kind} participant identifier")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_http_client;
    use crate::config::FhirServerConfig;
    use crate::token::{TokenHolder, TokenState};
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE_PATH: &str = "/fhir";
    const RESPONSE_PATH: &str = "/projherophilus/appointmentresponse";

    fn sample_event() -> Value {
        json!({
            "resourceType": "Appointment",
            "identifier": [{"value": "appt-1"}],
            "description": "Adjustment",
            "start": "2026-10-20T13:00:00.000Z",
            "end": "2026-10-20T13:30:00.000Z",
            "participant": [
                {"actor": {"type": "Patient", "identifier": {"value": "pa-1"}}},
                {"actor": {"type": "Practitioner", "identifier": {"value": "pr-1"}}},
                {"actor": {"type": "Location", "identifier": {"value": "lo-1"}}}
            ]
        })
    }

    async fn mount_resources(server: &MockServer) {
        for (kind, id, body) in [
            ("Patient", "pa-1", json!({"resourceType": "Patient", "id": "pa-1", "name": [{"text": "Sarah Baker"}]})),
            ("Practitioner", "pr-1", json!({"resourceType": "Practitioner", "id": "pr-1", "name": [{"text": "Dr. Ada Smith"}]})),
            ("Location", "lo-1", json!({"resourceType": "Location", "id": "lo-1", "name": "Atlanta"})),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("{BASE_PATH}/{kind}/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server)
                .await;
        }
    }

    fn workflow_for(server: &MockServer) -> AppointmentWorkflow {
        let http = build_http_client(Duration::from_secs(2)).expect("http client");
        let resources = ResourceClient::new(
            http.clone(),
            &FhirServerConfig {
                url: server.uri(),
                base_path: BASE_PATH.into(),
            },
        );
        AppointmentWorkflow::new(resources, http, format!("{}{RESPONSE_PATH}", server.uri()))
    }

    fn holder_with_token() -> TokenHolder {
        let holder = TokenHolder::new("refresh");
        holder.store(TokenState {
            access_token: Some("access-1".into()),
            refresh_token: "refresh".into(),
            refreshed_at: None,
        });
        holder
    }

    fn event_bytes(event: &Value) -> Vec<u8> {
        serde_json::to_vec(event).expect("encode")
    }

    #[tokio::test]
    async fn publishes_response_echoing_request() {
        let server = MockServer::start().await;
        mount_resources(&server).await;
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let response = workflow_for(&server)
            .handle_payload(&event_bytes(&sample_event()))
            .await
            .expect("handled");

        assert_eq!(
            response.appointment.identifier_value(),
            Some("appt-1")
        );
        assert_eq!(response.start.as_deref(), Some("2026-10-20T13:00:00.000Z"));
        assert_eq!(response.end.as_deref(), Some("2026-10-20T13:30:00.000Z"));
        assert_eq!(response.actor.identifier_value(), Some("lo-1"));

        let requests = server.received_requests().await.expect("recording enabled");
        let published = requests
            .iter()
            .find(|r| r.url.path() == RESPONSE_PATH)
            .expect("published");
        let body: Value = serde_json::from_slice(&published.body).expect("json body");
        assert_eq!(body["resourceType"], "AppointmentResponse");
        assert_eq!(body["participantStatus"], "accepted");
        assert_eq!(body["appointment"]["identifier"]["value"], "appt-1");
    }

    #[tokio::test]
    async fn failed_read_publishes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE_PATH}/Patient/pa-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceType": "Patient", "id": "pa-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE_PATH}/Practitioner/pr-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE_PATH}/Location/lo-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceType": "Location", "id": "lo-1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = workflow_for(&server)
            .handle_payload(&event_bytes(&sample_event()))
            .await
            .expect_err("read fails");
        assert!(err.is_transport());
        assert_eq!(err.upstream_status(), Some(404));
    }

    #[tokio::test]
    async fn connector_failure_propagates() {
        let server = MockServer::start().await;
        mount_resources(&server).await;
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = workflow_for(&server)
            .handle_payload(&event_bytes(&sample_event()))
            .await
            .expect_err("publish fails");
        assert_eq!(err.upstream_status(), Some(503));
    }

    #[tokio::test]
    async fn calendar_failure_does_not_block_publication() {
        let server = MockServer::start().await;
        mount_resources(&server).await;
        Mock::given(method("POST"))
            .and(path("/me/events"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let http = build_http_client(Duration::from_secs(2)).expect("http client");
        let calendar = CalendarClient::new(http, format!("{}/me/events", server.uri()), holder_with_token());
        let workflow = workflow_for(&server).with_calendar(calendar);

        workflow
            .handle_payload(&event_bytes(&sample_event()))
            .await
            .expect("published despite calendar failure");
    }

    #[tokio::test]
    async fn calendar_event_is_created_with_bearer_token() {
        let server = MockServer::start().await;
        mount_resources(&server).await;
        Mock::given(method("POST"))
            .and(path("/me/events"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "evt-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let http = build_http_client(Duration::from_secs(2)).expect("http client");
        let calendar = CalendarClient::new(http, format!("{}/me/events", server.uri()), holder_with_token());

        workflow_for(&server)
            .with_calendar(calendar)
            .handle_payload(&event_bytes(&sample_event()))
            .await
            .expect("handled");

        let requests = server.received_requests().await.expect("recording enabled");
        let event = requests
            .iter()
            .find(|r| r.url.path() == "/me/events")
            .expect("calendar request");
        let body: Value = serde_json::from_slice(&event.body).expect("json body");
        assert_eq!(body["subject"], "Adjustment - Sarah Baker");
        assert_eq!(body["location"]["displayName"], "Atlanta");
    }

    #[tokio::test]
    async fn reprocessing_yields_distinct_response_ids() {
        let server = MockServer::start().await;
        mount_resources(&server).await;
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let workflow = workflow_for(&server);
        let payload = event_bytes(&sample_event());
        let first = workflow.handle_payload(&payload).await.expect("first");
        let second = workflow.handle_payload(&payload).await.expect("second");

        assert_ne!(first.response_id(), second.response_id());
    }

    #[tokio::test]
    async fn missing_participant_type_is_not_found() {
        let server = MockServer::start().await;
        let mut event = sample_event();
        event["participant"]
            .as_array_mut()
            .expect("participants")
            .retain(|p| p["actor"]["type"] != "Location");

        let err = workflow_for(&server)
            .handle_payload(&event_bytes(&event))
            .await
            .expect_err("no location");
        match err {
            CoreError::NotFound(what) => assert_eq!(what, "Location participant"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(server.received_requests().await.expect("recording").is_empty());
    }

    #[tokio::test]
    async fn missing_participant_list_is_missing_field() {
        let server = MockServer::start().await;
        let mut event = sample_event();
        event.as_object_mut().expect("object").remove("participant");

        let err = workflow_for(&server)
            .handle_payload(&event_bytes(&event))
            .await
            .expect_err("no participants");
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "participant"));
    }

    #[tokio::test]
    async fn missing_window_is_missing_field() {
        let server = MockServer::start().await;
        let mut event = sample_event();
        event.as_object_mut().expect("object").remove("end");

        let err = workflow_for(&server)
            .handle_payload(&event_bytes(&event))
            .await
            .expect_err("no end");
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "end"));
    }

    #[tokio::test]
    async fn actor_without_identifier_is_missing_field() {
        let server = MockServer::start().await;
        let mut event = sample_event();
        event["participant"][0] = json!({"actor": {"type": "Patient", "reference": "Patient/1"}});

        let err = workflow_for(&server)
            .handle_payload(&event_bytes(&event))
            .await
            .expect_err("no patient identifier");
        match err {
            CoreError::MissingField(what) => assert_eq!(what, "Patient participant identifier"),
            other => panic!("expected MissingField, got {other:?}"),
        }
        assert!(server.received_requests().await.expect("recording").is_empty());
    }

    #[tokio::test]
    async fn resource_reads_run_concurrently() {
        let delay = Duration::from_millis(600);
        let server = MockServer::start().await;
        for (kind, id) in [("Patient", "pa-1"), ("Practitioner", "pr-1"), ("Location", "lo-1")] {
            Mock::given(method("GET"))
                .and(path(format!("{BASE_PATH}/{kind}/{id}")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"resourceType": kind, "id": id}))
                        .set_delay(delay),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path(RESPONSE_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let started = std::time::Instant::now();
        workflow_for(&server)
            .handle_payload(&event_bytes(&sample_event()))
            .await
            .expect("handled");

        assert!(
            started.elapsed() < delay * 2,
            "reads took {:?}",
            started.elapsed()
        );
    }
}
