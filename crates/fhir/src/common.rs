//! FHIR R4 complex datatypes shared by the resource models.
//!
//! Only the elements this service reads or writes are modelled.

use serde::{Deserialize, Deserializer, Serialize};

/// Business identifier (`Identifier`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Identifier {
    /// An identifier carrying only a value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            system: None,
            value: Some(value.into()),
        }
    }
}

/// Reference from one resource to another (`Reference`).
///
/// Appointment participants reference their actors by `type` plus a business identifier
/// rather than by literal `reference`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// The `identifier.value` of this reference, if present and non-blank.
    pub fn identifier_value(&self) -> Option<&str> {
        self.identifier
            .as_ref()
            .and_then(|identifier| identifier.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Name of a person (`HumanName`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanName {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

impl HumanName {
    /// Text rendering of the name: `text` when present, else given names followed by family.
    pub fn display(&self) -> Option<String> {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(text.to_string());
        }

        let parts: Vec<&str> = self
            .given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Telecommunications channel kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointSystem {
    Phone,
    Fax,
    Email,
    Pager,
    Url,
    Sms,
    Other,
}

/// Purpose of a contact point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPointUse {
    Home,
    Work,
    Temp,
    Old,
    Mobile,
}

/// Contact details (`ContactPoint`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<ContactPointSystem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<ContactPointUse>,

    /// Preference order. Some upstream systems send this as a string.
    #[serde(
        default,
        deserialize_with = "lenient_rank",
        skip_serializing_if = "Option::is_none"
    )]
    pub rank: Option<u32>,
}

impl ContactPoint {
    pub fn new(system: ContactPointSystem, value: impl Into<String>, use_type: ContactPointUse) -> Self {
        Self {
            system: Some(system),
            value: Some(value.into()),
            use_type: Some(use_type),
            rank: None,
        }
    }

    pub fn ranked(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }
}

fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rank {
        Number(u32),
        Text(String),
    }

    match Option::<Rank>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Rank::Number(n)) => Ok(Some(n)),
        Some(Rank::Text(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Postal address (`Address`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A reference to a code defined by a terminology system (`Coding`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Concept with codings and/or text (`CodeableConcept`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Time range (`Period`). Kept as strings; FHIR allows partial dates such as `"1995"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// Content by reference (`Attachment`), used for practitioner photos.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_accepts_number_or_string() {
        let from_number: ContactPoint =
            serde_json::from_str(r#"{"system":"phone","value":"+1","rank":2}"#).expect("number");
        let from_string: ContactPoint =
            serde_json::from_str(r#"{"system":"phone","value":"+1","rank":"1"}"#).expect("string");
        let absent: ContactPoint =
            serde_json::from_str(r#"{"system":"email","value":"a@b.c"}"#).expect("absent");

        assert_eq!(from_number.rank, Some(2));
        assert_eq!(from_string.rank, Some(1));
        assert_eq!(absent.rank, None);
    }

    #[test]
    fn human_name_prefers_text() {
        let name = HumanName {
            use_type: Some("usual".into()),
            text: Some("Sarah Lee Baker".into()),
            family: Some("Baker".into()),
            given: vec!["Sarah".into()],
        };
        assert_eq!(name.display().as_deref(), Some("Sarah Lee Baker"));
    }

    #[test]
    fn human_name_falls_back_to_parts() {
        let name = HumanName {
            use_type: None,
            text: None,
            family: Some("Williams".into()),
            given: vec!["Sarah".into(), "Jane".into()],
        };
        assert_eq!(name.display().as_deref(), Some("Sarah Jane Williams"));
        assert_eq!(HumanName::default().display(), None);
    }

    #[test]
    fn reference_identifier_value_ignores_blank() {
        let blank = Reference {
            identifier: Some(Identifier::value("  ")),
            ..Reference::default()
        };
        let set = Reference {
            identifier: Some(Identifier::value("abc")),
            ..Reference::default()
        };
        assert_eq!(blank.identifier_value(), None);
        assert_eq!(set.identifier_value(), Some("abc"));
    }

    #[test]
    fn reference_serialises_type_tag() {
        let reference = Reference {
            type_: Some("Location".into()),
            identifier: Some(Identifier::value("loc-1")),
            ..Reference::default()
        };
        let json = serde_json::to_value(&reference).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({"type": "Location", "identifier": {"value": "loc-1"}})
        );
    }
}
