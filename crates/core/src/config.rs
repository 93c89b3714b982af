//! Service runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the components that
//! need it. Nothing reads process-wide environment variables while handling a request or event.
//!
//! All values come from the environment (optionally populated from a `.env` file by the binary).
//! There are no command-line flags.

use crate::constants::{
    DEFAULT_CALENDAR_EVENTS_URL, DEFAULT_CONNECTOR_RESPONSE_PATH, DEFAULT_CONNECTOR_URL,
    DEFAULT_FHIR_BASE_PATH, DEFAULT_FHIR_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_KAFKA_BOOTSTRAP,
    DEFAULT_KAFKA_GROUP_ID, DEFAULT_KAFKA_TOPIC, DEFAULT_OAUTH_AUTHORITY, DEFAULT_PORT,
    DEFAULT_TOKEN_REFRESH_INTERVAL_SECS,
};
use crate::{CoreError, CoreResult};
use std::time::Duration;

/// Flat service configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub fhir: FhirServerConfig,
    pub connector: ConnectorConfig,
    pub kafka: KafkaConfig,
    /// `None` when any of the OAuth settings is missing; calendar events are then disabled.
    pub oauth: Option<OAuthConfig>,
    pub calendar_events_url: String,
    pub token_refresh_interval: Duration,
    pub http_timeout: Duration,
    pub port: u16,
}

/// Location of the FHIR resource server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FhirServerConfig {
    pub url: String,
    pub base_path: String,
}

/// Location of the downstream connector receiving appointment responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub url: String,
    pub response_path: String,
}

impl ConnectorConfig {
    /// Full URL appointment responses are POSTed to.
    pub fn response_url(&self) -> String {
        join_url(&self.url, &self.response_path)
    }
}

/// Broker connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl KafkaConfig {
    /// SASL credentials, present only when both username and password are configured.
    pub fn sasl_credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for KafkaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaConfig")
            .field("bootstrap_servers", &self.bootstrap_servers)
            .field("topic", &self.topic)
            .field("group_id", &self.group_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// OAuth client settings for the calendar provider.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub authority_url: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Refresh token used for the first exchange at startup.
    pub initial_refresh_token: String,
}

impl OAuthConfig {
    /// Token endpoint for the configured tenant.
    pub fn token_url(&self) -> String {
        join_url(
            &self.authority_url,
            &format!("/{}/oauth2/v2.0/token", self.tenant_id),
        )
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authority_url", &self.authority_url)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("initial_refresh_token", &"***")
            .finish()
    }
}

impl Config {
    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if a numeric setting cannot be parsed.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if a numeric setting cannot be parsed or is zero where a
    /// positive value is required.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let fhir = FhirServerConfig {
            url: get_or("HAPI_FHIR_URL", DEFAULT_FHIR_URL),
            base_path: get_or("HAPI_FHIR_BASE_PATH", DEFAULT_FHIR_BASE_PATH),
        };

        let connector = ConnectorConfig {
            url: get_or("IDAAS_CONNECT_URL", DEFAULT_CONNECTOR_URL),
            response_path: get_or("IDAAS_CONNECT_RESPONSE_PATH", DEFAULT_CONNECTOR_RESPONSE_PATH),
        };

        let kafka = KafkaConfig {
            bootstrap_servers: get_or("KAFKA_BOOTSTRAP_SERVER", DEFAULT_KAFKA_BOOTSTRAP),
            topic: get_or("KAFKA_TOPIC", DEFAULT_KAFKA_TOPIC),
            group_id: get_or("KAFKA_CONSUMER_GROUP_ID", DEFAULT_KAFKA_GROUP_ID),
            username: get("KAFKA_USERNAME"),
            password: get("KAFKA_PASSWORD"),
        };

        let oauth = match (
            get("TENANT_ID"),
            get("CLIENT_ID"),
            get("CLIENT_SECRET"),
            get("PROVIDER_REFRESH_TOKEN"),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Some(OAuthConfig {
                    authority_url: get_or("OAUTH_AUTHORITY_URL", DEFAULT_OAUTH_AUTHORITY),
                    tenant_id,
                    client_id,
                    client_secret,
                    initial_refresh_token: refresh_token,
                })
            }
            _ => None,
        };

        let token_refresh_secs = parse_positive(
            "TOKEN_REFRESH_INTERVAL_SECS",
            get("TOKEN_REFRESH_INTERVAL_SECS"),
            DEFAULT_TOKEN_REFRESH_INTERVAL_SECS,
        )?;
        let http_timeout_secs = parse_positive(
            "HTTP_TIMEOUT_SECS",
            get("HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| CoreError::Config(format!("PORT '{raw}' is not a valid port: {e}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            fhir,
            connector,
            kafka,
            oauth,
            calendar_events_url: get_or("CALENDAR_EVENTS_URL", DEFAULT_CALENDAR_EVENTS_URL),
            token_refresh_interval: Duration::from_secs(token_refresh_secs),
            http_timeout: Duration::from_secs(http_timeout_secs),
            port,
        })
    }

    /// Whether calendar events should be created alongside appointment responses.
    pub fn calendar_enabled(&self) -> bool {
        self.oauth.is_some()
    }
}

fn parse_positive(key: &str, raw: Option<String>, default: u64) -> CoreResult<u64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(CoreError::Config(format!("{key} must be greater than zero"))),
        Ok(value) => Ok(value),
        Err(e) => Err(CoreError::Config(format!(
            "{key} '{raw}' is not a whole number of seconds: {e}"
        ))),
    }
}

/// Join a base URL and a path with exactly one `/` between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> CoreResult<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config_from(&[]).expect("defaults");
        assert_eq!(cfg.fhir.url, DEFAULT_FHIR_URL);
        assert_eq!(cfg.fhir.base_path, DEFAULT_FHIR_BASE_PATH);
        assert_eq!(cfg.kafka.topic, "fhirsvr_appointment");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.token_refresh_interval, Duration::from_secs(30 * 60));
        assert_eq!(cfg.http_timeout, Duration::from_secs(5));
        assert!(cfg.oauth.is_none());
        assert!(!cfg.calendar_enabled());
        assert!(cfg.kafka.sasl_credentials().is_none());
        assert_eq!(
            cfg.connector.response_url(),
            "http://idaas-connect:80/projherophilus/appointmentresponse"
        );
    }

    #[test]
    fn oauth_requires_all_settings() {
        let partial = config_from(&[("TENANT_ID", "t"), ("CLIENT_ID", "c")]).expect("partial");
        assert!(partial.oauth.is_none());

        let full = config_from(&[
            ("TENANT_ID", "tenant"),
            ("CLIENT_ID", "client"),
            ("CLIENT_SECRET", "s3cr3t-value"),
            ("PROVIDER_REFRESH_TOKEN", "refresh"),
        ])
        .expect("full");
        let oauth = full.oauth.expect("oauth configured");
        assert_eq!(
            oauth.token_url(),
            "https://login.microsoftonline.com/tenant/oauth2/v2.0/token"
        );
        assert!(!format!("{oauth:?}").contains("s3cr3t-value"));
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = config_from(&[("HAPI_FHIR_URL", "   "), ("KAFKA_USERNAME", "")]).expect("cfg");
        assert_eq!(cfg.fhir.url, DEFAULT_FHIR_URL);
        assert!(cfg.kafka.username.is_none());
    }

    #[test]
    fn sasl_needs_username_and_password() {
        let cfg = config_from(&[("KAFKA_USERNAME", "u"), ("KAFKA_PASSWORD", "p")]).expect("cfg");
        assert_eq!(cfg.kafka.sasl_credentials(), Some(("u", "p")));
        assert!(!format!("{:?}", cfg.kafka).contains("\"p\""));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(matches!(config_from(&[("PORT", "eighty")]), Err(CoreError::Config(_))));
        assert!(matches!(
            config_from(&[("HTTP_TIMEOUT_SECS", "0")]),
            Err(CoreError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("TOKEN_REFRESH_INTERVAL_SECS", "-1")]),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(join_url("http://a/", "/b"), "http://a/b");
        assert_eq!(join_url("http://a", "b"), "http://a/b");
        assert_eq!(join_url("http://a/", ""), "http://a");
    }
}
