use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::context::{ApiRequest, ApiResponse, RequestContext};
use super::middleware::{Middleware, ResponseAction};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// The single configured pipeline for talking to the remote API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()?;
        Ok(Self::with_http(http, &config.base_url))
    }

    /// Builds a client around an existing reqwest client, so the refresh call can share it.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            middleware: Vec::new(),
        }
    }

    /// Appends a stage to the chain. Request stages run in the order they were added.
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Runs the request through the middleware chain.
    ///
    /// A replay requested by a response stage sends the request again from the
    /// top of the chain. Non-success responses that survive the chain become
    /// an [`ApiError`].
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut ctx = RequestContext::new(request);

        loop {
            ctx.attempt += 1;
            for stage in &self.middleware {
                stage.on_request(&mut ctx).await?;
            }

            let response = self.send(&ctx.request).await?;

            let mut action = ResponseAction::Continue(response);
            for stage in self.middleware.iter().rev() {
                action = match action {
                    ResponseAction::Continue(response) => {
                        stage.on_response(&mut ctx, response).await?
                    }
                    replay @ ResponseAction::Replay => replay,
                };
            }

            match action {
                ResponseAction::Replay => {
                    debug!(
                        "Replaying {} '{}' (attempt {})",
                        ctx.request.method,
                        ctx.request.path,
                        ctx.attempt + 1
                    );
                    continue;
                }
                ResponseAction::Continue(response) if response.is_success() => {
                    return Ok(response)
                }
                ResponseAction::Continue(response) => {
                    let err = ApiError::from_response(response.status, &response.body);
                    if let ApiError::Unknown(_) = err {
                        warn!(
                            "{} '{}' failed: {}",
                            ctx.request.method, ctx.request.path, err
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| {
            error!("{} '{}' failed to send: {}", request.method, url, e);
            ApiError::Network(e)
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| {
            error!("Failed to read response body from '{}': {}", url, e);
            ApiError::Network(e)
        })?;
        debug!("{} '{}' -> {}", request.method, request.path, status);

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path)).await?.json()
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::get(path).with_query(query))
            .await?
            .json()
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::post(path).with_json(to_json(body)?))
            .await?
            .json()
    }

    /// POST without a body, for action endpoints like `/purchase/`.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(ApiRequest::post(path)).await?.json()
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(ApiRequest::patch(path).with_json(to_json(body)?))
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Unknown(format!("failed to encode request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{client_with_chain, seeded_storage};
    use crate::storage::{keys, KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use http::StatusCode;
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    const EXPIRED_BODY: &str =
        r#"{"detail": "Given token not valid for any token type", "code": "token_not_valid"}"#;

    fn seeded() -> Arc<MemoryStore> {
        seeded_storage("old-access", "refresh-1")
    }

    #[tokio::test]
    async fn test_sends_bearer_header() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/users/me/")
            .match_header("authorization", "Bearer old-access")
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let (client, _) = client_with_chain(&server.url(), seeded());
        let body: Value = client.get("/users/me/").await.unwrap();

        m.assert_async().await;
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_replayed_once() {
        let mut server = Server::new_async().await;
        let expired = server
            .mock("GET", "/notifications/")
            .match_header("authorization", "Bearer old-access")
            .with_status(401)
            .with_body(EXPIRED_BODY)
            .expect(1)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token/refresh/")
            .match_body(Matcher::Json(json!({ "refresh": "refresh-1" })))
            .with_status(200)
            .with_body(r#"{"access": "new-access"}"#)
            .expect(1)
            .create_async()
            .await;
        let replay = server
            .mock("GET", "/notifications/")
            .match_header("authorization", "Bearer new-access")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let storage = seeded();
        let (client, history) = client_with_chain(&server.url(), storage.clone());
        let body: Vec<Value> = client.get("/notifications/").await.unwrap();

        expired.assert_async().await;
        refresh.assert_async().await;
        replay.assert_async().await;
        assert!(body.is_empty());
        assert_eq!(storage.get(keys::ACCESS_TOKEN).as_deref(), Some("new-access"));
        assert!(history.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_second_unauthorized_after_replay_propagates() {
        let mut server = Server::new_async().await;
        let protected = server
            .mock("GET", "/users/me/")
            .with_status(401)
            .with_body(EXPIRED_BODY)
            .expect(2)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access": "new-access"}"#)
            .expect(1)
            .create_async()
            .await;

        let (client, _) = client_with_chain(&server.url(), seeded());
        let result: Result<Value, _> = client.get("/users/me/").await;

        protected.assert_async().await;
        refresh.assert_async().await;
        assert!(matches!(result, Err(ApiError::AuthExpired { .. })));
    }

    #[tokio::test]
    async fn test_failed_refresh_ends_session_and_redirects() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/families/")
            .with_status(401)
            .with_body(EXPIRED_BODY)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("POST", "/token/refresh/")
            .with_status(401)
            .with_body(EXPIRED_BODY)
            .expect(1)
            .create_async()
            .await;

        let storage = seeded();
        let (client, history) = client_with_chain(&server.url(), storage.clone());
        let result: Result<Value, _> = client.get("/families/").await;

        assert!(result.is_err());
        assert_eq!(storage.get(keys::ACCESS_TOKEN), None);
        assert_eq!(storage.get(keys::REFRESH_TOKEN), None);
        assert_eq!(history.last().as_deref(), Some("/login"));
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/families/")
            .with_status(400)
            .with_body(r#"{"name": ["This field is required."]}"#)
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token/refresh/")
            .expect(0)
            .create_async()
            .await;

        let (client, _) = client_with_chain(&server.url(), seeded());
        let result: Result<Value, _> = client.post("/families/", &json!({})).await;

        refresh.assert_async().await;
        match result {
            Err(ApiError::Validation { status, body }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("required"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_unknown() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/wishlists/")
            .with_status(502)
            .create_async()
            .await;

        let (client, _) = client_with_chain(&server.url(), seeded());
        let result: Result<Value, _> = client.get("/wishlists/").await;
        assert!(matches!(result, Err(ApiError::Unknown(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 9 on a test host.
        let (client, _) = client_with_chain("http://127.0.0.1:9", seeded());
        let result: Result<Value, _> = client.get("/users/me/").await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for Recorder {
        fn get_name(&self) -> &str {
            &self.name
        }

        async fn on_request(&self, _ctx: &mut RequestContext) -> Result<(), ApiError> {
            self.log.lock().unwrap().push(format!("req:{}", self.name));
            Ok(())
        }

        async fn on_response(
            &self,
            _ctx: &mut RequestContext,
            response: ApiResponse,
        ) -> Result<ResponseAction, ApiError> {
            self.log.lock().unwrap().push(format!("resp:{}", self.name));
            Ok(ResponseAction::Continue(response))
        }
    }

    #[tokio::test]
    async fn test_chain_order_is_onion_shaped() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/users/")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |name: &str| {
            Arc::new(Recorder {
                name: name.to_string(),
                log: log.clone(),
            })
        };
        let client = ApiClient::with_http(reqwest::Client::new(), &server.url())
            .with_middleware(recorder("a"))
            .with_middleware(recorder("b"));

        let _: Vec<Value> = client.get("/users/").await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["req:a", "req:b", "resp:b", "resp:a"]
        );
    }
}
