use crate::error::ApiError;
use crate::patient_form::{FormOrJson, NewPatientForm};
use crate::slots::{canned_slots, parse_timezone, AppointmentPeriod};
use crate::AppState;
use api_shared::{ErrorEnvelope, HealthRes, LookupError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use fhir::Slot;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientQuery {
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub distance: Option<String>,
    pub units: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotQuery {
    pub timezone: Option<String>,
    pub appointment_time: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Used by container health checks and load balancers. Reports healthy whenever the process
/// can answer.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthRes> {
    Json(state.health.check_health())
}

#[utoipa::path(
    get,
    path = "/api/patient",
    params(
        ("email" = String, Query, description = "Patient email address"),
        ("phoneNumber" = Option<String>, Query, description = "Patient phone number")
    ),
    responses(
        (status = 200, description = "First matching Patient resource"),
        (status = 400, description = "Email missing", body = LookupError),
        (status = 404, description = "No matching patient", body = LookupError),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// Look up a patient by email (and optionally phone number)
///
/// # Returns
/// * `Ok(Json<Value>)` - The first matching Patient resource
///
/// # Errors
/// - `400` with `bad_request` if `email` is missing.
/// - `404` with `patient_not_found` if the search matches nothing.
/// - `500` if the resource server search fails.
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Value>, ApiError> {
    let Some(email) = non_blank(&query.email) else {
        return Err(ApiError::more_input_required());
    };

    let mut params = vec![("email", email)];
    if let Some(phone) = non_blank(&query.phone_number) {
        params.push(("phone", phone));
    }

    let entries = state.resources.search("Patient", &params).await?;
    entries
        .into_iter()
        .find_map(|entry| entry.resource)
        .map(Json)
        .ok_or_else(ApiError::patient_not_found)
}

#[utoipa::path(
    post,
    path = "/api/patient",
    request_body(content = NewPatientForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Created Patient resource"),
        (status = 400, description = "Bad request", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// Register a new patient from the sign-up form
///
/// Accepts the form urlencoded or as JSON and creates the Patient on the resource server.
///
/// # Returns
/// * `Ok(Json<Value>)` - The resource as stored by the server
///
/// # Errors
/// - `400` if the body cannot be parsed or `name` is missing.
/// - `500` if the resource server rejects the patient.
pub async fn create_patient(
    State(state): State<AppState>,
    FormOrJson(form): FormOrJson<NewPatientForm>,
) -> Result<Json<Value>, ApiError> {
    let patient = form.into_patient()?;
    tracing::info!("creating patient");
    let created = state.resources.create("Patient", &patient).await?;
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    params(
        ("latitude" = f64, Query, description = "Latitude of the search centre"),
        ("longitude" = f64, Query, description = "Longitude of the search centre"),
        ("distance" = Option<f64>, Query, description = "Search radius"),
        ("units" = Option<String>, Query, description = "Distance units (default `mi`)")
    ),
    responses(
        (status = 200, description = "Location resources near the point"),
        (status = 400, description = "Bad request", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// Search clinic locations near a point
///
/// # Errors
/// - `400` if `latitude` or `longitude` is missing or not a number.
/// - `500` if the resource server search fails.
#[axum::debug_handler]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let latitude = coordinate("latitude", non_blank(&query.latitude))?;
    let longitude = coordinate("longitude", non_blank(&query.longitude))?;
    let units = non_blank(&query.units).unwrap_or("mi");

    let near = match non_blank(&query.distance) {
        Some(distance) => format!("{latitude}|{longitude}|{distance}|{units}"),
        None => format!("{latitude}|{longitude}"),
    };

    let entries = state
        .resources
        .search("Location", &[("near", near.as_str())])
        .await?;
    Ok(Json(entries.into_iter().filter_map(|e| e.resource).collect()))
}

fn coordinate<'a>(name: &str, raw: Option<&'a str>) -> Result<&'a str, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::Validation(format!("{name} is required")))?;
    raw.parse::<f64>()
        .map_err(|_| ApiError::Validation(format!("{name} must be a number")))?;
    Ok(raw)
}

#[utoipa::path(
    get,
    path = "/api/locations/{locationId}/practitioners",
    params(
        ("locationId" = String, Path, description = "Location id")
    ),
    responses(
        (status = 200, description = "Practitioner resources"),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// List practitioners for a location
///
/// Practitioners are not linked to locations on the resource server yet, so every practitioner
/// is returned.
#[axum::debug_handler]
pub async fn list_practitioners(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    tracing::debug!(%location_id, "listing practitioners");
    // TODO: filter by location once practitioners carry a PractitionerRole link to it.
    let entries = state.resources.search("Practitioner", &[]).await?;
    Ok(Json(entries.into_iter().filter_map(|e| e.resource).collect()))
}

#[utoipa::path(
    get,
    path = "/api/slots",
    params(
        ("timezone" = Option<String>, Query, description = "IANA timezone (default America/New_York)"),
        ("appointmentTime" = Option<String>, Query, description = "`morning` or `afternoon` (default)")
    ),
    responses(
        (status = 200, description = "Free Slot resources"),
        (status = 400, description = "Unknown timezone", body = ErrorEnvelope)
    )
)]
/// Offer open appointment slots
pub async fn list_slots(Query(query): Query<SlotQuery>) -> Result<Json<Vec<Slot>>, ApiError> {
    let tz = parse_timezone(query.timezone.as_deref())
        .map_err(|name| ApiError::Validation(format!("unknown timezone '{name}'")))?;
    let period = AppointmentPeriod::parse(query.appointment_time.as_deref());
    Ok(Json(canned_slots(Utc::now().with_timezone(&tz), period)))
}

/// Fallback for unknown routes.
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorEnvelope::route_not_found()),
    )
}
