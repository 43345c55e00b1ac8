use std::sync::Arc;

use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{
    Activity, CreateWishList, CreateWishListItem, WishList, WishListFilter, WishListItem,
    WishListStats,
};

/// Wishlists and the items on them.
pub struct WishlistsService {
    client: Arc<ApiClient>,
}

impl WishlistsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: WishListFilter) -> Result<Vec<WishList>, ApiError> {
        self.client
            .get_with_query("/wishlists/", filter.to_query())
            .await
    }

    pub async fn get(&self, id: u64) -> Result<WishList, ApiError> {
        self.client.get(&format!("/wishlists/{}/", id)).await
    }

    pub async fn create(&self, data: &CreateWishList) -> Result<WishList, ApiError> {
        self.client.post("/wishlists/", data).await
    }

    pub async fn update(&self, id: u64, data: &CreateWishList) -> Result<WishList, ApiError> {
        self.client.patch(&format!("/wishlists/{}/", id), data).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete(&format!("/wishlists/{}/", id)).await
    }

    pub async fn create_item(&self, data: &CreateWishListItem) -> Result<WishListItem, ApiError> {
        self.client.post("/wishlist-items/", data).await
    }

    pub async fn update_item(&self, id: u64, data: &Value) -> Result<WishListItem, ApiError> {
        self.client
            .patch(&format!("/wishlist-items/{}/", id), data)
            .await
    }

    pub async fn delete_item(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/wishlist-items/{}/", id))
            .await
    }

    /// Marks the item bought by the current user. The server answers with an empty body;
    /// re-fetch the wishlist to see the new state.
    pub async fn purchase_item(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("/wishlist-items/{}/purchase/", id))
            .await
    }

    pub async fn unpurchase_item(&self, id: u64) -> Result<(), ApiError> {
        self.client
            .post_empty(&format!("/wishlist-items/{}/unpurchase/", id))
            .await
    }

    pub async fn stats(&self) -> Result<WishListStats, ApiError> {
        self.client.get("/wishlists/stats/").await
    }

    /// The ten most recent additions and purchases across the user's families.
    pub async fn recent_activity(&self) -> Result<Vec<Activity>, ApiError> {
        self.client.get("/wishlists/recent_activity/").await
    }

    /// Stores the display order on the server. The local copy lives in the app store.
    pub async fn reorder_items(&self, wishlist_id: u64, item_ids: &[u64]) -> Result<(), ApiError> {
        self.client
            .post::<_, Value>(
                "/wishlist-items/reorder_items/",
                &json!({ "wishlist_id": wishlist_id, "item_ids": item_ids }),
            )
            .await?;
        Ok(())
    }
}
