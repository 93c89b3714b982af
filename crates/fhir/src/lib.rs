//! FHIR wire/boundary support for the Coeus scheduling service.
//!
//! This crate provides **wire models** for the handful of FHIR R4 resources the service
//! exchanges with the clinical-data server, the message broker and the downstream connector:
//! - `Appointment` requests consumed from the broker
//! - `AppointmentResponse` resources published to the connector
//! - `Patient`, `Practitioner` and `Location` resources read from (or seeded into) the server
//! - `Bundle` search results and canned `Slot` listings
//!
//! Unlike an on-disk format, these payloads are owned by external systems. Models are therefore
//! lenient: unknown fields are ignored on read and optional fields are skipped on write.

pub mod appointment;
pub mod appointment_response;
pub mod bundle;
pub mod common;
pub mod location;
pub mod patient;
pub mod practitioner;
pub mod slot;

// Re-export facades
pub use appointment::{ActorType, Appointment, AppointmentParticipant};
pub use appointment_response::{AppointmentResponse, ParticipantStatus};
pub use bundle::{Bundle, BundleEntry};
pub use common::{
    Address, Attachment, CodeableConcept, Coding, ContactPoint, ContactPointSystem,
    ContactPointUse, HumanName, Identifier, Period, Reference,
};
pub use location::{HoursOfOperation, Location, Position};
pub use patient::{AdministrativeGender, Patient};
pub use practitioner::{Practitioner, Qualification};
pub use slot::{Slot, SlotStatus};

/// A FHIR resource type that can be addressed on a REST server as `/{RESOURCE_TYPE}/{id}`.
pub trait FhirResource {
    /// The FHIR `resourceType` discriminator, e.g. `"Patient"`.
    const RESOURCE_TYPE: &'static str;
}

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialise a JSON payload into `T`, reporting the path of the first mismatching field.
///
/// `what` names the payload in the error message (for example `"Appointment"`).
pub(crate) fn parse_json<T>(what: &str, bytes: &[u8]) -> FhirResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(FhirError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}
