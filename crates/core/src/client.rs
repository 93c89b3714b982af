//! Minimal REST client for the FHIR resource server.
//!
//! One [`ResourceClient`] wraps a shared, connection-pooled `reqwest::Client`; clone it freely.
//! There is deliberately no retry or backoff here: callers decide what a failure means.

use crate::config::{join_url, FhirServerConfig};
use crate::constants::ERROR_BODY_PREVIEW_BYTES;
use crate::{CoreError, CoreResult};
use fhir::{Bundle, BundleEntry, FhirResource};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const FHIR_JSON: &str = "application/fhir+json, application/json";

/// Build the shared outbound HTTP client with a per-request timeout.
///
/// # Errors
///
/// Returns [`CoreError::Transport`] if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> CoreResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .user_agent(concat!("coeus/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// REST client for one FHIR server base URL.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ResourceClient {
    /// Create a client for `{server.url}{server.base_path}`.
    pub fn new(http: reqwest::Client, server: &FhirServerConfig) -> Self {
        Self {
            http,
            base_url: join_url(&server.url, &server.base_path),
        }
    }

    /// The FHIR base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read a resource by id as untyped JSON.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or non-2xx status, and
    /// [`CoreError::Decode`] if the body is not JSON.
    pub async fn get(&self, resource_type: &str, id: &str) -> CoreResult<Value> {
        let url = self.resource_url(resource_type, Some(id));
        tracing::debug!(%url, "GET resource");
        let response = self.http.get(&url).header(ACCEPT, FHIR_JSON).send().await?;
        let body = success_body(response).await?;
        Ok(normalize_json(&body)?)
    }

    /// Read a resource by id into its typed wire model.
    ///
    /// # Errors
    ///
    /// As [`ResourceClient::get`], plus [`CoreError::Decode`] if the JSON does not match `R`.
    pub async fn read<R>(&self, id: &str) -> CoreResult<R>
    where
        R: FhirResource + DeserializeOwned,
    {
        let value = self.get(R::RESOURCE_TYPE, id).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Create a resource. Returns the server's representation of the stored resource.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or non-2xx status, and
    /// [`CoreError::Decode`] if the body is not JSON.
    pub async fn create<T>(&self, resource_type: &str, resource: &T) -> CoreResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let url = self.resource_url(resource_type, None);
        let payload = serde_json::to_vec(resource)?;
        tracing::debug!(%url, "POST resource");
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, FHIR_JSON)
            .body(payload)
            .send()
            .await?;
        let body = success_body(response).await?;
        Ok(normalize_json(&body)?)
    }

    /// Search a resource type and return the matching bundle entries.
    ///
    /// A bundle without `entry` yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a transport error on network failure or non-2xx status, and
    /// [`CoreError::Decode`] if the body is not a bundle.
    pub async fn search(
        &self,
        resource_type: &str,
        params: &[(&str, &str)],
    ) -> CoreResult<Vec<BundleEntry>> {
        let url = self.resource_url(resource_type, None);
        tracing::debug!(%url, ?params, "search resources");
        let response = self
            .http
            .get(&url)
            .query(params)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;
        let body = success_body(response).await?;
        let bundle: Bundle = serde_json::from_value(normalize_json(&body)?)?;
        Ok(bundle.entry)
    }

    fn resource_url(&self, resource_type: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{}/{}", self.base_url, resource_type, id),
            None => format!("{}/{}", self.base_url, resource_type),
        }
    }
}

/// Decode a JSON response body.
///
/// Some servers and proxies double-encode JSON as a JSON string; such bodies are decoded a second
/// time so callers always see structured values.
///
/// # Errors
///
/// Returns the underlying `serde_json` error for malformed bodies.
pub fn normalize_json(body: &[u8]) -> Result<Value, serde_json::Error> {
    match serde_json::from_slice::<Value>(body)? {
        Value::String(inner) => serde_json::from_str(&inner),
        other => Ok(other),
    }
}

/// Consume a response, returning its body if the status is 2xx.
///
/// # Errors
///
/// Returns [`CoreError::UnexpectedStatus`] (with a truncated body preview) for non-2xx statuses
/// and [`CoreError::Transport`] if the body cannot be read.
pub(crate) async fn success_body(response: reqwest::Response) -> CoreResult<Vec<u8>> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.bytes().await?;

    if status.is_success() {
        return Ok(body.to_vec());
    }

    let preview = String::from_utf8_lossy(&body)
        .chars()
        .take(ERROR_BODY_PREVIEW_BYTES)
        .collect();
    Err(CoreError::UnexpectedStatus {
        status: status.as_u16(),
        url,
        body: preview,
    })
}
