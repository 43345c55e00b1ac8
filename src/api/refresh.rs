use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::context::{ApiResponse, RequestContext};
use super::middleware::{Middleware, ResponseAction};
use super::navigator::Navigator;
use crate::error::{is_auth_failure, is_expiry_signal, ApiError};
use crate::storage::{keys, KeyValueStore};

pub const REFRESH_PATH: &str = "/token/refresh/";

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the server rotates refresh tokens.
    #[serde(default)]
    refresh: Option<String>,
}

/// Exchanges the stored refresh token for a new access token.
///
/// Refreshes are serialized. A caller that waited behind another refresh and
/// finds its stale token already replaced reuses the new one instead of
/// hitting the refresh endpoint again, so a burst of expired requests costs a
/// single refresh call.
pub struct TokenRefresher {
    http: reqwest::Client,
    refresh_url: String,
    storage: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    in_flight: Mutex<()>,
}

impl TokenRefresher {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            http,
            refresh_url: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH),
            storage,
            navigator,
            login_path: login_path.into(),
            in_flight: Mutex::new(()),
        }
    }

    /// Returns a usable access token, refreshing only if `stale_token` is still current.
    ///
    /// On failure the session is cleared and the navigator is sent to the login page.
    pub async fn refresh(&self, stale_token: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.in_flight.lock().await;

        let current = self
            .storage
            .get(keys::ACCESS_TOKEN)
            .filter(|t| !t.is_empty());
        match (current, stale_token) {
            (Some(current), Some(stale)) if current != stale => {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
            (None, Some(_)) => {
                // Someone else already failed to refresh and cleared the session.
                return Err(ApiError::AuthExpired {
                    status: StatusCode::UNAUTHORIZED,
                    message: "Session was cleared while waiting for a token refresh".to_string(),
                });
            }
            _ => {}
        }

        match self.exchange().await {
            Ok(access) => {
                info!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                warn!("Token refresh failed, ending session: {}", e);
                self.end_session();
                self.navigator.redirect(&self.login_path);
                Err(e)
            }
        }
    }

    async fn exchange(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .storage
            .get(keys::REFRESH_TOKEN)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::AuthExpired {
                status: StatusCode::UNAUTHORIZED,
                message: "No refresh token".to_string(),
            })?;

        debug!("Exchanging refresh token at '{}'", self.refresh_url);
        let resp = self
            .http
            .post(&self.refresh_url)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        let refreshed = ApiResponse::new(status, body).json::<RefreshResponse>()?;
        self.storage.set(keys::ACCESS_TOKEN, &refreshed.access)?;
        if let Some(rotated) = refreshed.refresh.as_deref() {
            self.storage.set(keys::REFRESH_TOKEN, rotated)?;
        }
        Ok(refreshed.access)
    }

    fn end_session(&self) {
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to clear '{}' from storage: {}", key, e);
            }
        }
    }
}

/// Response stage that recovers from an expired access token.
///
/// On a 401/403 carrying an expiry signal it spends the request's retry budget,
/// refreshes, and asks for a replay. With the budget spent the response passes
/// through and the caller sees the failure.
pub struct TokenRefresh {
    refresher: Arc<TokenRefresher>,
}

impl TokenRefresh {
    pub fn new(refresher: Arc<TokenRefresher>) -> Self {
        Self { refresher }
    }
}

#[async_trait]
impl Middleware for TokenRefresh {
    fn get_name(&self) -> &str {
        "token-refresh"
    }

    async fn on_response(
        &self,
        ctx: &mut RequestContext,
        response: ApiResponse,
    ) -> Result<ResponseAction, ApiError> {
        if !is_auth_failure(response.status) || !is_expiry_signal(&response.body) {
            return Ok(ResponseAction::Continue(response));
        }

        if !ctx.retry_budget.try_consume() {
            debug!(
                "'{}' still unauthorized after replay; giving up",
                ctx.request.path
            );
            return Ok(ResponseAction::Continue(response));
        }

        debug!(
            "'{}' returned {} with an expired token; refreshing",
            ctx.request.path, response.status
        );
        self.refresher.refresh(ctx.sent_token.as_deref()).await?;
        Ok(ResponseAction::Replay)
    }
}
