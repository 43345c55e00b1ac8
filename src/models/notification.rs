use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewItem,
    Purchased,
    WishlistCreated,
}

/// A notification about activity in one of the user's families.
///
/// `target_id` points at the wishlist or item the notification is about.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub target_id: u64,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Marking read is one-way; there is no way back to unread.
    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_api_payload() {
        let raw = r#"[
            {"id": 1, "user": 3, "type": "new_item", "target_id": 10, "read": false, "created_at": "2024-12-01T10:00:00Z"},
            {"id": 2, "user": 3, "type": "wishlist_created", "target_id": 4, "read": true, "created_at": "2024-12-02T08:30:00.123456Z"}
        ]"#;
        let notifications: Vec<Notification> = serde_json::from_str(raw).unwrap();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].kind, NotificationKind::NewItem);
        assert!(!notifications[0].read);
        assert_eq!(notifications[1].kind, NotificationKind::WishlistCreated);
    }

    #[test]
    fn mark_read_is_monotonic() {
        let mut notification = Notification {
            id: 1,
            kind: NotificationKind::Purchased,
            target_id: 2,
            read: false,
            created_at: Utc::now(),
        };
        notification.mark_read();
        notification.mark_read();
        assert!(notification.read);
    }
}
