use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::Notification;

/// Where the app store gets notifications from.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn list(&self) -> Result<Vec<Notification>, ApiError>;
    async fn mark_read(&self, id: u64) -> Result<(), ApiError>;
    async fn mark_all_read(&self) -> Result<(), ApiError>;
}

pub struct NotificationsService {
    client: Arc<ApiClient>,
}

impl NotificationsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationSource for NotificationsService {
    async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.client.get("/notifications/").await
    }

    async fn mark_read(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .patch::<_, Value>(&format!("/notifications/{}/", id), &json!({ "read": true }))
            .await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.client
            .patch::<_, Value>("/notifications/mark-all-read/", &json!({}))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_list_and_mark() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/notifications/")
            .with_status(200)
            .with_body(
                r#"[{"id": 5, "type": "purchased", "target_id": 9, "read": false, "created_at": "2024-11-30T12:00:00Z"}]"#,
            )
            .create_async()
            .await;
        let one = server
            .mock("PATCH", "/notifications/5/")
            .match_body(Matcher::Json(json!({ "read": true })))
            .with_status(200)
            .with_body(r#"{"id": 5}"#)
            .create_async()
            .await;
        let all = server
            .mock("PATCH", "/notifications/mark-all-read/")
            .with_status(200)
            .with_body(r#"{"status": "notifications marked as read"}"#)
            .create_async()
            .await;

        let client = Arc::new(ApiClient::with_http(reqwest::Client::new(), &server.url()));
        let service = NotificationsService::new(client);

        let notifications = service.list().await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Purchased);

        service.mark_read(5).await.unwrap();
        service.mark_all_read().await.unwrap();
        one.assert_async().await;
        all.assert_async().await;
    }
}
