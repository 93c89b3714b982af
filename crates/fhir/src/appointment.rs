//! Appointment request wire model.
//!
//! Appointment requests arrive on the broker as FHIR `Appointment` JSON. The workflow needs the
//! business identifier, the booked window and one actor of each participant type; everything
//! else is carried along untouched or ignored.

use crate::common::{Identifier, Reference};
use crate::{FhirError, FhirResource, FhirResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participant actor kinds the scheduling workflow resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorType {
    Patient,
    Practitioner,
    Location,
}

impl ActorType {
    /// The `Reference.type` tag for this actor kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ActorType::Patient => "Patient",
            ActorType::Practitioner => "Practitioner",
            ActorType::Location => "Location",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A FHIR `Appointment` as published on the appointment topic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "resourceType", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// `None` when the payload omitted the element entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<Vec<AppointmentParticipant>>,
}

/// One party involved in an appointment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentParticipant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FhirResource for Appointment {
    const RESOURCE_TYPE: &'static str = "Appointment";
}

impl Appointment {
    /// Parse an appointment from a JSON event payload.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if the payload is not JSON or any modelled field has an
    /// unexpected type (for example `participant` not being an array), and
    /// [`FhirError::InvalidInput`] if `resourceType` is present but not `"Appointment"`.
    pub fn from_json(bytes: &[u8]) -> FhirResult<Self> {
        let appointment: Appointment = crate::parse_json("Appointment", bytes)?;

        if let Some(resource_type) = appointment.resource_type.as_deref() {
            if resource_type != Self::RESOURCE_TYPE {
                return Err(FhirError::InvalidInput(format!(
                    "Expected resourceType 'Appointment', got '{resource_type}'"
                )));
            }
        }

        Ok(appointment)
    }

    /// The first business identifier of the appointment.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::MissingField`] if `identifier` is absent or empty.
    pub fn primary_identifier(&self) -> FhirResult<&Identifier> {
        self.identifier
            .first()
            .ok_or_else(|| FhirError::MissingField("identifier".into()))
    }

    /// The participant list.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::MissingField`] if `participant` is absent.
    pub fn participants(&self) -> FhirResult<&[AppointmentParticipant]> {
        self.participant
            .as_deref()
            .ok_or_else(|| FhirError::MissingField("participant".into()))
    }

    /// The actor of the first participant tagged with `kind`, if any.
    ///
    /// Participants without an actor are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::MissingField`] if `participant` is absent.
    pub fn actor(&self, kind: ActorType) -> FhirResult<Option<&Reference>> {
        Ok(self
            .participants()?
            .iter()
            .filter_map(|participant| participant.actor.as_ref())
            .find(|actor| actor.type_.as_deref() == Some(kind.as_str())))
    }
}
