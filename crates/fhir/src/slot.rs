//! Slot wire model for open-slot listings.

use crate::FhirResource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Availability of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStatus {
    Busy,
    Free,
    BusyUnavailable,
    BusyTentative,
    EnteredInError,
}

/// A FHIR `Slot`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub resource_type: String,
    pub id: String,
    pub status: SlotStatus,
    pub start: String,
    pub end: String,
}

impl FhirResource for Slot {
    const RESOURCE_TYPE: &'static str = "Slot";
}

impl Slot {
    /// A free slot with a freshly generated id.
    pub fn free(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            id: Uuid::new_v4().to_string(),
            status: SlotStatus::Free,
            start: start.into(),
            end: end.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_slot_shape() {
        let slot = Slot::free("2026-10-20T13:00:00.000Z", "2026-10-20T13:30:00.000Z");
        let json = serde_json::to_value(&slot).expect("serialise");
        assert_eq!(json["resourceType"], "Slot");
        assert_eq!(json["status"], "free");
        assert!(Uuid::parse_str(json["id"].as_str().expect("id")).is_ok());
    }
}
