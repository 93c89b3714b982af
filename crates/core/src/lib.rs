//! # Coeus Core
//!
//! Core service logic for the Coeus scheduling integration service.
//!
//! This crate contains everything that talks to external systems on behalf of the service:
//! - Runtime configuration resolved once at startup ([`Config`])
//! - The FHIR resource server REST client ([`ResourceClient`])
//! - OAuth token state and its periodic refresher ([`TokenHolder`], [`TokenRefresher`])
//! - Calendar event creation ([`CalendarClient`])
//! - The appointment auto-approval workflow ([`AppointmentWorkflow`])
//!
//! **No transport concerns**: HTTP routing and message consumption belong in `api-rest` and
//! `coeus-consumer`.

pub mod calendar;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod shutdown;
pub mod token;
pub mod workflow;

pub use calendar::{CalendarClient, CalendarEvent};
pub use client::{build_http_client, normalize_json, ResourceClient};
pub use config::{Config, ConnectorConfig, FhirServerConfig, KafkaConfig, OAuthConfig};
pub use error::{CoreError, CoreResult};
pub use shutdown::{cancel_on_exit, wait_for_signal};
pub use token::{TokenHolder, TokenRefresher, TokenState};
pub use workflow::AppointmentWorkflow;
