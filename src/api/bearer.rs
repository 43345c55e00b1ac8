use std::sync::Arc;

use async_trait::async_trait;
use http::header::{HeaderValue, AUTHORIZATION};
use tracing::debug;

use super::context::RequestContext;
use super::middleware::Middleware;
use crate::error::ApiError;
use crate::storage::{keys, KeyValueStore};

/// Attaches `Authorization: Bearer <token>` from the persisted session.
///
/// The token is read from storage before every attempt, so a replay after a
/// refresh picks up the new token and a logout leaves no stale header behind.
pub struct BearerAuth {
    storage: Arc<dyn KeyValueStore>,
}

impl BearerAuth {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Middleware for BearerAuth {
    fn get_name(&self) -> &str {
        "bearer-auth"
    }

    async fn on_request(&self, ctx: &mut RequestContext) -> Result<(), ApiError> {
        let token = self
            .storage
            .get(keys::ACCESS_TOKEN)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                    ApiError::Unknown(format!("stored access token is not a valid header: {}", e))
                })?;
                ctx.request.headers.insert(AUTHORIZATION, value);
                ctx.sent_token = Some(token);
            }
            None => {
                debug!("No access token stored; sending '{}' anonymously", ctx.request.path);
                ctx.request.headers.remove(AUTHORIZATION);
                ctx.sent_token = None;
            }
        }
        Ok(())
    }
}
