//! Location wire model.

use crate::common::{Address, ContactPoint};
use crate::FhirResource;
use serde::{Deserialize, Serialize};

/// A FHIR `Location` (a clinic site).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPoint>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hours_of_operation: Vec<HoursOfOperation>,
}

/// WGS84 coordinates used by `near` searches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

/// Opening hours for a set of weekdays.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursOfOperation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            id: None,
            status: None,
            name: None,
            alias: Vec::new(),
            description: None,
            telecom: Vec::new(),
            address: None,
            position: None,
            hours_of_operation: Vec::new(),
        }
    }
}

impl FhirResource for Location {
    const RESOURCE_TYPE: &'static str = "Location";
}
