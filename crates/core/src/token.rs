//! OAuth access-token state and its periodic refresher.
//!
//! Responsibilities:
//! - Hold the current access/refresh token pair behind an atomic pointer swap so readers never
//!   block the refresher.
//! - Exchange the refresh token for a new pair on a fixed interval.
//!
//! Notes:
//! - A failed refresh never modifies the stored state; the previous pair stays in use until the
//!   next successful exchange.
//! - Readers take a snapshot (`Arc<TokenState>`) and never observe a half-written pair.

use crate::client::success_body;
use crate::config::OAuthConfig;
use crate::{CoreError, CoreResult};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The most recent token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenState {
    /// `None` until the first successful refresh.
    pub access_token: Option<String>,
    pub refresh_token: String,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("refresh_token", &"***")
            .field("refreshed_at", &self.refreshed_at)
            .finish()
    }
}

/// Cloneable handle to the shared token state.
#[derive(Clone, Debug)]
pub struct TokenHolder {
    inner: Arc<ArcSwap<TokenState>>,
}

impl TokenHolder {
    /// A holder seeded with the configured refresh token and no access token.
    pub fn new(initial_refresh_token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(TokenState {
                access_token: None,
                refresh_token: initial_refresh_token.into(),
                refreshed_at: None,
            })),
        }
    }

    /// The current state. Cheap; does not block the refresher.
    pub fn snapshot(&self) -> Arc<TokenState> {
        self.inner.load_full()
    }

    /// The current access token, if a refresh has succeeded yet.
    pub fn access_token(&self) -> Option<String> {
        self.inner.load().access_token.clone()
    }

    pub(crate) fn store(&self, state: TokenState) {
        self.inner.store(Arc::new(state));
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Exchanges refresh tokens with the OAuth authority and publishes the result to a
/// [`TokenHolder`].
#[derive(Clone, Debug)]
pub struct TokenRefresher {
    http: reqwest::Client,
    oauth: OAuthConfig,
    holder: TokenHolder,
}

impl TokenRefresher {
    pub fn new(http: reqwest::Client, oauth: OAuthConfig, holder: TokenHolder) -> Self {
        Self {
            http,
            oauth,
            holder,
        }
    }

    /// The holder this refresher writes to.
    pub fn holder(&self) -> &TokenHolder {
        &self.holder
    }

    /// Perform one refresh-token exchange.
    ///
    /// # Returns
    ///
    /// The newly stored state.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the authority is unreachable or rejects the request, and
    /// [`CoreError::Decode`] if the response lacks an access token. The holder is left untouched
    /// in every error case.
    pub async fn refresh_once(&self) -> CoreResult<Arc<TokenState>> {
        let current = self.holder.snapshot();
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.oauth.client_id.as_str()),
            ("client_secret", self.oauth.client_secret.as_str()),
            ("refresh_token", current.refresh_token.as_str()),
        ];

        let response = self
            .http
            .post(self.oauth.token_url())
            .form(&form)
            .send()
            .await?;
        let body = success_body(response).await?;
        let parsed: TokenResponse = serde_json::from_slice(&body)?;

        if parsed.access_token.trim().is_empty() {
            return Err(CoreError::TokenUnavailable);
        }

        let next = TokenState {
            access_token: Some(parsed.access_token),
            refresh_token: parsed
                .refresh_token
                .filter(|token| !token.is_empty())
                .unwrap_or_else(|| current.refresh_token.clone()),
            refreshed_at: Some(Utc::now()),
        };
        self.holder.store(next);

        tracing::info!(expires_in = ?parsed.expires_in, "access token refreshed");
        Ok(self.holder.snapshot())
    }

    /// Refresh immediately, then every `interval`, until `shutdown` is cancelled.
    ///
    /// Failures are logged and retried at the next tick.
    pub async fn run(self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("token refresher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        tracing::error!("token refresh failed: {e}");
                    }
                }
            }
        }
    }
}
