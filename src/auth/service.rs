use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Credentials, Session, TokenPair, User};
use crate::storage::{keys, KeyValueStore};

pub const LOGIN_PATH: &str = "/token/";
pub const CURRENT_USER_PATH: &str = "/users/me/";
pub const REQUEST_RESET_PATH: &str = "/password-reset/request_reset/";
pub const RESET_PASSWORD_PATH: &str = "/password-reset/reset_password/";

/// What a successful login hands back.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: Session,
    pub user: User,
}

/// Login, logout, token validation and password-reset flows.
///
/// The session itself lives in the key-value store; this service only reads
/// and writes it there.
pub struct AuthService {
    client: Arc<ApiClient>,
    storage: Arc<dyn KeyValueStore>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { client, storage }
    }

    /// Exchanges credentials for a token pair, persists it, then loads the profile
    /// with the new access token. Rejected credentials are returned as-is, no retry.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ApiError> {
        debug!("Logging in '{}'", credentials.email);
        let pair: TokenPair = match self.client.post(LOGIN_PATH, credentials).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Login failed for '{}': {}", credentials.email, e);
                return Err(e);
            }
        };

        self.storage.set(keys::ACCESS_TOKEN, &pair.access)?;
        self.storage.set(keys::REFRESH_TOKEN, &pair.refresh)?;

        let user: User = self.client.get(CURRENT_USER_PATH).await?;
        info!("User '{}' logged in", user.username);

        Ok(LoginOutcome {
            session: Session::from(&pair),
            user,
        })
    }

    /// Forgets both tokens. Safe to call without a session; never fails.
    pub fn logout(&self) {
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to clear '{}' from storage: {}", key, e);
            }
        }
        debug!("Session cleared");
    }

    /// Local check only: a stored token may still be rejected by the server.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_active()
    }

    pub fn session(&self) -> Session {
        Session::load(self.storage.as_ref())
    }

    /// Loads the profile for the stored token. Any failure ends the session.
    pub async fn validate_token(&self) -> Result<User, ApiError> {
        match self.client.get::<User>(CURRENT_USER_PATH).await {
            Ok(user) => {
                debug!("Stored token belongs to '{}'", user.username);
                Ok(user)
            }
            Err(e) => {
                warn!("Stored token could not be validated: {}", e);
                self.logout();
                Err(e)
            }
        }
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        self.client
            .post::<_, Value>(REQUEST_RESET_PATH, &json!({ "email": email }))
            .await?;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        user_id: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.client
            .post::<_, Value>(
                RESET_PASSWORD_PATH,
                &json!({
                    "user_id": user_id,
                    "token": token,
                    "new_password": new_password,
                }),
            )
            .await?;
        Ok(())
    }
}
