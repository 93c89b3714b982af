//! # API Shared
//!
//! Shared response types for the Coeus HTTP surface.
//!
//! Contains:
//! - `HealthService` and its `HealthRes` payload
//! - The JSON error envelope returned for unhandled failures and unknown routes
//! - The `{error, error_code}` body returned by lookup endpoints
//!
//! Used by `api-rest` and by the combined `coeus-run` binary.

pub mod error;
pub mod health;

pub use error::{ErrorEnvelope, LookupError};
pub use health::{HealthRes, HealthService};
