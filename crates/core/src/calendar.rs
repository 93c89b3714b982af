//! Calendar event creation for accepted appointments.
//!
//! Events are POSTed to a Graph-style `/events` endpoint using the bearer token currently held by
//! the [`TokenHolder`].

use crate::client::success_body;
use crate::token::TokenHolder;
use crate::{CoreError, CoreResult};
use fhir::{Appointment, Location, Patient, Practitioner};
use serde::Serialize;

/// Calendar event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub subject: String,
    pub body: EventBody,
    pub start: EventTime,
    pub end: EventTime,
    pub location: EventLocation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub content_type: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: String,
    pub time_zone: String,
}

impl EventTime {
    fn utc(date_time: &str) -> Self {
        Self {
            date_time: date_time.to_string(),
            time_zone: "UTC".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email_address: EmailAddress,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CalendarEvent {
    /// Build the event for an accepted appointment from the resolved resources.
    ///
    /// The body embeds the names and ids of all three parties so the calendar entry stands on its
    /// own. The patient is invited when they have an email address.
    pub fn for_appointment(
        appointment: &Appointment,
        patient: &Patient,
        practitioner: &Practitioner,
        location: &Location,
    ) -> Self {
        let patient_name = patient
            .display_name()
            .unwrap_or_else(|| "Unknown patient".to_string());
        let practitioner_name = practitioner
            .display_name()
            .unwrap_or_else(|| "Unknown practitioner".to_string());
        let location_name = location
            .name
            .clone()
            .unwrap_or_else(|| "Unknown location".to_string());

        let subject = match appointment.description.as_deref() {
            Some(description) if !description.trim().is_empty() => {
                format!("{description} - {patient_name}")
            }
            _ => format!("Appointment with {patient_name}"),
        };

        let content = format!(
            "Patient: {patient_name} (id: {})\nPractitioner: {practitioner_name} (id: {})\nLocation: {location_name} (id: {})",
            patient.id.as_deref().unwrap_or("-"),
            practitioner.id.as_deref().unwrap_or("-"),
            location.id.as_deref().unwrap_or("-"),
        );

        let attendees = patient
            .email()
            .map(|email| Attendee {
                email_address: EmailAddress {
                    address: email.to_string(),
                    name: patient.display_name(),
                },
                type_: "required".to_string(),
            })
            .into_iter()
            .collect();

        Self {
            subject,
            body: EventBody {
                content_type: "text".to_string(),
                content,
            },
            start: EventTime::utc(appointment.start.as_deref().unwrap_or_default()),
            end: EventTime::utc(appointment.end.as_deref().unwrap_or_default()),
            location: EventLocation {
                display_name: location_name,
            },
            attendees,
        }
    }
}

/// Client for the calendar provider's event endpoint.
#[derive(Clone, Debug)]
pub struct CalendarClient {
    http: reqwest::Client,
    events_url: String,
    tokens: TokenHolder,
}

impl CalendarClient {
    pub fn new(http: reqwest::Client, events_url: impl Into<String>, tokens: TokenHolder) -> Self {
        Self {
            http,
            events_url: events_url.into(),
            tokens,
        }
    }

    /// Create a calendar event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TokenUnavailable`] if no access token has been obtained yet, and a
    /// transport error if the provider is unreachable or rejects the event.
    pub async fn create_event(&self, event: &CalendarEvent) -> CoreResult<()> {
        let token = self.tokens.access_token().ok_or(CoreError::TokenUnavailable)?;
        let response = self
            .http
            .post(&self.events_url)
            .bearer_auth(token)
            .json(event)
            .send()
            .await?;
        success_body(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::{ContactPoint, ContactPointSystem, ContactPointUse, HumanName};
    use serde_json::json;

    fn named(text: &str) -> HumanName {
        HumanName {
            text: Some(text.to_string()),
            ..HumanName::default()
        }
    }

    #[test]
    fn event_embeds_all_parties() {
        let appointment = Appointment {
            description: Some("Adjustment".into()),
            start: Some("2026-10-20T13:00:00Z".into()),
            end: Some("2026-10-20T13:30:00Z".into()),
            ..Appointment::default()
        };
        let patient = Patient {
            id: Some("pa-1".into()),
            name: vec![named("Sarah Baker")],
            telecom: vec![ContactPoint::new(
                ContactPointSystem::Email,
                "sarah@example.com",
                ContactPointUse::Home,
            )],
            ..Patient::default()
        };
        let practitioner = Practitioner {
            id: Some("pr-1".into()),
            name: vec![named("Dr. Ada Smith")],
            ..Practitioner::default()
        };
        let location = Location {
            id: Some("lo-1".into()),
            name: Some("Atlanta".into()),
            ..Location::default()
        };

        let event = CalendarEvent::for_appointment(&appointment, &patient, &practitioner, &location);
        let value = serde_json::to_value(&event).expect("serialise");

        assert_eq!(value["subject"], "Adjustment - Sarah Baker");
        assert_eq!(value["start"], json!({"dateTime": "2026-10-20T13:00:00Z", "timeZone": "UTC"}));
        assert_eq!(value["location"]["displayName"], "Atlanta");
        assert_eq!(value["attendees"][0]["emailAddress"]["address"], "sarah@example.com");

        let content = value["body"]["content"].as_str().expect("content");
        assert!(content.contains("Sarah Baker (id: pa-1)"));
        assert!(content.contains("Dr. Ada Smith (id: pr-1)"));
        assert!(content.contains("Atlanta (id: lo-1)"));
    }

    #[test]
    fn patient_without_email_is_not_invited() {
        let event = CalendarEvent::for_appointment(
            &Appointment::default(),
            &Patient::default(),
            &Practitioner::default(),
            &Location::default(),
        );
        assert!(event.attendees.is_empty());
        assert_eq!(event.subject, "Appointment with Unknown patient");
        let value = serde_json::to_value(&event).expect("serialise");
        assert!(value.get("attendees").is_none());
    }

    #[tokio::test]
    async fn create_event_without_token_fails() {
        let http = crate::client::build_http_client(std::time::Duration::from_secs(1))
            .expect("http client");
        let client = CalendarClient::new(http, "http://127.0.0.1:9/events", TokenHolder::new("r"));
        let event = CalendarEvent::for_appointment(
            &Appointment::default(),
            &Patient::default(),
            &Practitioner::default(),
            &Location::default(),
        );

        assert!(matches!(
            client.create_event(&event).await,
            Err(CoreError::TokenUnavailable)
        ));
    }
}
