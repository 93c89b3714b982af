//! FHIR-aligned patient wire model.
//!
//! Patients are read by the scheduling workflow (name, email) and written by the HTTP API and the
//! seed tool. The struct is the wire format: it serialises directly to the JSON the resource
//! server accepts.

use crate::common::{Address, CodeableConcept, ContactPoint, ContactPointSystem, HumanName, Identifier};
use crate::FhirResource;
use serde::{Deserialize, Serialize};

/// Administrative gender of a patient or practitioner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// Map a single-letter sex code (`M`/`F`) to a gender. Anything else is `Other`.
    pub fn from_sex_code(code: &str) -> Self {
        match code.trim() {
            "M" | "m" => AdministrativeGender::Male,
            "F" | "f" => AdministrativeGender::Female,
            _ => AdministrativeGender::Other,
        }
    }
}

/// A FHIR `Patient`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    /// ISO 8601 date (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deceased_boolean: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_birth_boolean: Option<bool>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            id: None,
            identifier: Vec::new(),
            active: None,
            name: Vec::new(),
            telecom: Vec::new(),
            gender: None,
            birth_date: None,
            deceased_boolean: None,
            address: Vec::new(),
            marital_status: None,
            multiple_birth_boolean: None,
        }
    }
}

impl FhirResource for Patient {
    const RESOURCE_TYPE: &'static str = "Patient";
}

impl Patient {
    /// Display name from the first `name` entry.
    pub fn display_name(&self) -> Option<String> {
        self.name.first().and_then(HumanName::display)
    }

    /// First email address in `telecom`.
    pub fn email(&self) -> Option<&str> {
        self.telecom_value(ContactPointSystem::Email)
    }

    /// First phone number in `telecom`.
    pub fn phone(&self) -> Option<&str> {
        self.telecom_value(ContactPointSystem::Phone)
    }

    fn telecom_value(&self, system: ContactPointSystem) -> Option<&str> {
        self.telecom
            .iter()
            .filter(|contact| contact.system == Some(system))
            .find_map(|contact| contact.value.as_deref())
    }
}
