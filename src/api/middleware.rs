use async_trait::async_trait;

use super::context::{ApiResponse, RequestContext};
use crate::error::ApiError;

/// What a response stage wants the client to do next.
#[derive(Debug)]
pub enum ResponseAction {
    /// Hand the response to the next stage (and finally the caller).
    Continue(ApiResponse),
    /// Drop this response and send the request again. The stage asking for a
    /// replay is responsible for spending the context's retry budget first.
    Replay,
}

/// A stage in the client's request/response pipeline.
///
/// Request stages run in registration order before every attempt, including
/// replays. Response stages run in reverse order. Returning an error from
/// either stage short-circuits the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    fn get_name(&self) -> &str;

    async fn on_request(&self, _ctx: &mut RequestContext) -> Result<(), ApiError> {
        Ok(())
    }

    async fn on_response(
        &self,
        _ctx: &mut RequestContext,
        response: ApiResponse,
    ) -> Result<ResponseAction, ApiError> {
        Ok(ResponseAction::Continue(response))
    }
}
