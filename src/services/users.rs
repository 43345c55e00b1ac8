use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::User;

pub struct UsersService {
    client: Arc<ApiClient>,
}

impl UsersService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Everyone who shares a family with the current user.
    pub async fn members(&self) -> Result<Vec<User>, ApiError> {
        self.client.get("/users/").await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<User>, ApiError> {
        self.client
            .get_with_query("/users/search/", vec![("q".to_string(), query.to_string())])
            .await
    }

    pub async fn current(&self) -> Result<User, ApiError> {
        self.client.get("/users/me/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_search_encodes_query() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/users/search/")
            .match_query(Matcher::UrlEncoded("q".into(), "ad am".into()))
            .with_status(200)
            .with_body(r#"[{"id": 1, "username": "adam", "email": "adam@example.com"}]"#)
            .create_async()
            .await;

        let client = Arc::new(ApiClient::with_http(reqwest::Client::new(), &server.url()));
        let users = UsersService::new(client).search("ad am").await.unwrap();

        m.assert_async().await;
        assert_eq!(users[0].username, "adam");
    }
}
