//! Constants used throughout the Coeus core crate.
//!
//! Defaults for every configuration value live here so the binaries, the seed tool and the tests
//! agree on them.

/// Default FHIR server location.
pub const DEFAULT_FHIR_URL: &str = "http://hapi-fhir:80";

/// Default base path of the FHIR REST API on the server.
pub const DEFAULT_FHIR_BASE_PATH: &str = "/hapi-fhir-jpaserver/fhir";

/// Default downstream connector location.
pub const DEFAULT_CONNECTOR_URL: &str = "http://idaas-connect:80";

/// Connector path receiving appointment responses.
pub const DEFAULT_CONNECTOR_RESPONSE_PATH: &str = "/projherophilus/appointmentresponse";

/// Default broker bootstrap address.
pub const DEFAULT_KAFKA_BOOTSTRAP: &str = "localhost:9092";

/// Topic carrying appointment requests published by the FHIR server.
pub const DEFAULT_KAFKA_TOPIC: &str = "fhirsvr_appointment";

/// Default consumer group id.
pub const DEFAULT_KAFKA_GROUP_ID: &str = "coeus-provider-service";

/// Kafka client id reported to the broker.
pub const KAFKA_CLIENT_ID: &str = "coeus-provider-service";

/// Default OAuth authority.
pub const DEFAULT_OAUTH_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Default calendar API endpoint for event creation.
pub const DEFAULT_CALENDAR_EVENTS_URL: &str = "https://graph.microsoft.com/v1.0/me/events";

/// Token refresh period (30 minutes).
pub const DEFAULT_TOKEN_REFRESH_INTERVAL_SECS: u64 = 30 * 60;

/// Per-request timeout for outbound HTTP calls.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

/// Default HTTP API listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum number of response-body bytes kept in error messages.
pub const ERROR_BODY_PREVIEW_BYTES: usize = 512;
