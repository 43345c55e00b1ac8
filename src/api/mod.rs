//! The outbound HTTP pipeline.
//!
//! Every call to the remote API goes through [`ApiClient`], which runs an
//! ordered chain of [`Middleware`] around each attempt. Request stages run in
//! registration order, response stages in reverse, and any stage can
//! short-circuit with an error or ask for the request to be replayed.

pub mod bearer;
pub mod client;
pub mod context;
pub mod middleware;
pub mod navigator;
pub mod refresh;

pub use bearer::BearerAuth;
pub use client::ApiClient;
pub use context::{ApiRequest, ApiResponse, RequestContext, RetryBudget};
pub use middleware::{Middleware, ResponseAction};
pub use navigator::{NavigationHistory, Navigator};
pub use refresh::{TokenRefresh, TokenRefresher};

#[cfg(test)]
pub(crate) mod testing;
