//! AppointmentResponse wire model.
//!
//! The service answers every appointment request with an `AppointmentResponse` carrying a fresh
//! random identifier. Redelivery of the same request therefore produces a second, distinct
//! response.

use crate::common::{Identifier, Reference};
use crate::FhirResource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment attached to responses produced by the auto-approval workflow.
pub const AUTO_APPROVAL_COMMENT: &str = "Scheduled using Coeus";

/// Participation status of the responding actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
}

/// A FHIR `AppointmentResponse`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub resource_type: String,

    pub identifier: Vec<Identifier>,

    /// Reference to the appointment, by business identifier.
    pub appointment: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    pub actor: Reference,

    pub participant_status: ParticipantStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FhirResource for AppointmentResponse {
    const RESOURCE_TYPE: &'static str = "AppointmentResponse";
}

impl AppointmentResponse {
    /// Build an acceptance for the appointment identified by `appointment_identifier`.
    ///
    /// The response gets a newly generated UUID identifier, echoes the appointment window
    /// verbatim and names `actor` as the accepting party.
    pub fn accept(
        appointment_identifier: Identifier,
        start: Option<String>,
        end: Option<String>,
        actor: Reference,
    ) -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            identifier: vec![Identifier::value(Uuid::new_v4().to_string())],
            appointment: Reference {
                identifier: Some(appointment_identifier),
                display: Some("Appointment".to_string()),
                ..Reference::default()
            },
            start,
            end,
            actor,
            participant_status: ParticipantStatus::Accepted,
            comment: Some(AUTO_APPROVAL_COMMENT.to_string()),
        }
    }

    /// The generated identifier of this response.
    pub fn response_id(&self) -> Option<&str> {
        self.identifier
            .first()
            .and_then(|identifier| identifier.value.as_deref())
    }
}
