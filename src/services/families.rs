use std::sync::Arc;

use serde_json::json;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{CreateFamily, Family};

pub struct FamiliesService {
    client: Arc<ApiClient>,
}

impl FamiliesService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Family>, ApiError> {
        self.client.get("/families/").await
    }

    pub async fn get(&self, id: u64) -> Result<Family, ApiError> {
        self.client.get(&format!("/families/{}/", id)).await
    }

    pub async fn create(&self, data: &CreateFamily) -> Result<Family, ApiError> {
        self.client.post("/families/", data).await
    }

    pub async fn update(&self, id: u64, data: &CreateFamily) -> Result<Family, ApiError> {
        self.client.patch(&format!("/families/{}/", id), data).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&format!("/families/{}/", id)).await
    }

    pub async fn add_member(&self, family_id: u64, user_id: u64) -> Result<Family, ApiError> {
        self.client
            .post(
                &format!("/families/{}/add_member/", family_id),
                &json!({ "user_id": user_id }),
            )
            .await
    }

    pub async fn remove_member(&self, family_id: u64, user_id: u64) -> Result<Family, ApiError> {
        self.client
            .post(
                &format!("/families/{}/remove_member/", family_id),
                &json!({ "user_id": user_id }),
            )
            .await
    }
}
