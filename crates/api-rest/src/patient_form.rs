//! New-patient form handling.
//!
//! The patient sign-up form posts flat string fields, either urlencoded or as JSON. This module
//! turns them into a FHIR `Patient` ready to be created on the resource server.

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use fhir::{
    Address, AdministrativeGender, ContactPoint, ContactPointSystem, ContactPointUse, HumanName,
    Identifier, Patient,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body extractor accepting `application/json` or `application/x-www-form-urlencoded`.
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// Fields of the new-patient form. All optional except `name`.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPatientForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// `M`, `F`, or anything else for other.
    pub sex: Option<String>,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewPatientForm {
    /// Build the patient resource for this form.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if `name` is missing or blank.
    pub fn into_patient(self) -> Result<Patient, ApiError> {
        let name = present(self.name)
            .ok_or_else(|| ApiError::Validation("name is required".into()))?;
        let birth_date = present(self.birth_date);
        let street = present(self.address);
        let street2 = present(self.address2);
        let city = present(self.city);
        let state = present(self.state);
        let zip_code = present(self.zip_code);

        let identifier = [birth_date.clone(), street.clone()]
            .into_iter()
            .flatten()
            .map(Identifier::value)
            .collect();

        let mut telecom = Vec::new();
        if let Some(phone) = present(self.phone_number) {
            telecom.push(ContactPoint::new(
                ContactPointSystem::Phone,
                phone,
                ContactPointUse::Mobile,
            ));
        }
        if let Some(email) = present(self.email) {
            telecom.push(ContactPoint::new(
                ContactPointSystem::Email,
                email,
                ContactPointUse::Home,
            ));
        }

        let line: Vec<String> = street.iter().chain(street2.iter()).cloned().collect();
        let text = format!(
            "{}, {}, {} {}",
            line.join(" "),
            city.as_deref().unwrap_or_default(),
            state.as_deref().unwrap_or_default(),
            zip_code.as_deref().unwrap_or_default(),
        );

        Ok(Patient {
            active: Some(true),
            identifier,
            name: vec![HumanName {
                use_type: Some("official".into()),
                text: Some(name),
                ..HumanName::default()
            }],
            telecom,
            gender: Some(AdministrativeGender::from_sex_code(
                self.sex.as_deref().unwrap_or_default(),
            )),
            birth_date,
            address: vec![Address {
                use_type: Some("home".into()),
                text: Some(text.trim().to_string()),
                line,
                city,
                state,
                postal_code: zip_code,
                country: present(self.country),
                ..Address::default()
            }],
            ..Patient::default()
        })
    }
}
