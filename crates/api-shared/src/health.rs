use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    /// Version of the running service.
    pub version: String,
    pub healthy: bool,
}

/// Simple health service shared by the HTTP handlers and the runner.
///
/// The service reports healthy whenever the process is able to answer; dependency checks are not
/// performed.
#[derive(Clone, Debug)]
pub struct HealthService {
    version: String,
}

impl HealthService {
    /// Creates a health service reporting `version`.
    ///
    /// # Returns
    /// A new `HealthService` instance.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Build the health response.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health(&self) -> HealthRes {
        HealthRes {
            version: self.version.clone(),
            healthy: true,
        }
    }
}
