//! # API REST
//!
//! REST API implementation for Coeus.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation (served as JSON at `/api-docs/openapi.json`)
//! - REST-specific concerns (form/JSON bodies, error envelopes, CORS, request tracing)
//!
//! Uses `api-shared` for common response types and `coeus-core` for the resource server client.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod patient_form;
pub mod slots;

use api_shared::{ErrorEnvelope, HealthRes, HealthService, LookupError};
use axum::{response::Json, routing::get, Router};
use coeus_core::ResourceClient;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub use error::ApiError;

/// Application state shared across REST API handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub resources: ResourceClient,
    pub health: HealthService,
}

impl AppState {
    /// `version` is what `/healthz` reports; binaries pass their own package version.
    pub fn new(resources: ResourceClient, version: impl Into<String>) -> Self {
        Self {
            resources,
            health: HealthService::new(version),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::healthz,
        handlers::get_patient,
        handlers::create_patient,
        handlers::list_locations,
        handlers::list_practitioners,
        handlers::list_slots,
    ),
    components(schemas(
        HealthRes,
        ErrorEnvelope,
        LookupError,
        patient_form::NewPatientForm,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the HTTP router.
///
/// Unknown routes answer with a `route_not_found` error envelope.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/api/patient",
            get(handlers::get_patient).post(handlers::create_patient),
        )
        .route("/api/locations", get(handlers::list_locations))
        .route(
            "/api/locations/:locationId/practitioners",
            get(handlers::list_practitioners),
        )
        .route("/api/slots", get(handlers::list_slots))
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
