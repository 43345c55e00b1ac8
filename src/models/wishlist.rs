use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WishList {
    pub id: u64,
    pub name: String,
    pub owner: User,
    pub family: u64,
    #[serde(default)]
    pub items: Vec<WishListItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

/// A gift on a wishlist. Prices travel as decimal strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WishListItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub link: String,
    /// Uploaded image.
    #[serde(default)]
    pub image: Option<String>,
    /// Image discovered from the product page.
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_purchased: bool,
    /// Primary key of the buyer.
    #[serde(default)]
    pub purchased_by: Option<u64>,
    #[serde(default)]
    pub purchased_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub wishlist: u64,
}

/// Payload for creating a wishlist, or partially updating one.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateWishList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateWishListItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ItemSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    pub wishlist: u64,
}

/// Query filters for listing wishlists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WishListFilter {
    pub family: Option<u64>,
    pub owner: Option<u64>,
}

impl WishListFilter {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(family) = self.family {
            query.push(("family".to_string(), family.to_string()));
        }
        if let Some(owner) = self.owner {
            query.push(("owner".to_string(), owner.to_string()));
        }
        query
    }
}

/// Counters behind the home dashboard, scoped to the signed-in user.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WishListStats {
    pub total_wishlists: u64,
    pub total_items: u64,
    pub purchased_items: u64,
    pub total_families: u64,
}

/// One line of the family activity feed: an item added or purchased.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// `add_<item id>` or `purchase_<item id>`.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Presentation hint, `info` for additions and `success` for purchases.
    pub color: String,
}

impl Activity {
    pub fn is_purchase(&self) -> bool {
        self.id.starts_with("purchase_")
    }

    /// The item the entry is about, parsed from the id.
    pub fn item_id(&self) -> Option<u64> {
        self.id
            .rsplit_once('_')
            .and_then(|(_, id)| id.parse().ok())
    }
}
