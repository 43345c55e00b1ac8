//! Client-side application state.
//!
//! One `AppStore` is built at startup and handed to the router guard and the
//! UI layer. It owns the current user, the notification list and the device
//! preferences (theme, item order); the session tokens stay in the key-value
//! store and are reached through the auth service.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::auth::{AuthService, LoginOutcome};
use crate::error::ApiError;
use crate::models::{Credentials, Notification, User};
use crate::services::NotificationSource;
use crate::storage::{keys, KeyValueStore};

/// Where the store is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Initializing,
    /// Initialization finished. The current user may still be `None` (anonymous).
    Ready,
}

struct AppState {
    lifecycle: Lifecycle,
    current_user: Option<User>,
    notifications: Vec<Notification>,
    dark_theme: bool,
    item_order: HashMap<u64, Vec<u64>>,
}

pub struct AppStore {
    auth: Arc<AuthService>,
    notifications: Arc<dyn NotificationSource>,
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<AppState>,
    init: OnceCell<()>,
}

impl AppStore {
    /// Builds the store, restoring device preferences from storage.
    /// `prefers_dark` is used when no theme has been stored yet.
    pub fn new(
        auth: Arc<AuthService>,
        notifications: Arc<dyn NotificationSource>,
        storage: Arc<dyn KeyValueStore>,
        prefers_dark: bool,
    ) -> Self {
        let dark_theme = match storage.get(keys::THEME).as_deref() {
            Some("dark") => true,
            Some("light") => false,
            _ => prefers_dark,
        };
        let item_order = load_item_order(storage.as_ref());

        Self {
            auth,
            notifications,
            storage,
            state: RwLock::new(AppState {
                lifecycle: Lifecycle::Uninitialized,
                current_user: None,
                notifications: Vec::new(),
                dark_theme,
                item_order,
            }),
            init: OnceCell::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restores the session from storage, once per store.
    ///
    /// Callers that arrive while initialization is running wait for it to
    /// settle instead of starting their own. Whatever happens, the store ends
    /// up `Ready`; a rejected token just leaves it anonymous.
    pub async fn initialize_app(&self) {
        self.init
            .get_or_init(|| async {
                self.write().lifecycle = Lifecycle::Initializing;
                self.restore_session().await;
                self.write().lifecycle = Lifecycle::Ready;
                info!(
                    "App initialized ({})",
                    if self.current_user().is_some() {
                        "authenticated"
                    } else {
                        "anonymous"
                    }
                );
            })
            .await;
    }

    async fn restore_session(&self) {
        if !self.auth.is_authenticated() {
            debug!("No stored session; starting anonymous");
            return;
        }

        match self.auth.validate_token().await {
            Ok(user) => {
                self.write().current_user = Some(user);
                self.fetch_notifications().await;
            }
            Err(e) => {
                // Redirecting is the router guard's job, not ours.
                warn!("Could not restore session: {}", e);
                self.logout();
            }
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.read().lifecycle
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle() == Lifecycle::Ready
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle() == Lifecycle::Initializing
    }

    /// Logs in through the auth service and adopts the returned user.
    ///
    /// A restore already in flight is waited for first, so it cannot end the
    /// new session when the old token turns out to be stale. If none has
    /// started, the login takes its place and no restore will run.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, ApiError> {
        self.init
            .get_or_init(|| async {
                debug!("Login before initialization; skipping session restore");
                self.write().lifecycle = Lifecycle::Ready;
            })
            .await;

        let outcome = self.auth.login(credentials).await?;
        self.set_current_user(outcome.user.clone());
        self.fetch_notifications().await;
        Ok(outcome)
    }

    /// Ends the session. Theme and item order are device preferences and stay.
    pub fn logout(&self) {
        self.auth.logout();
        let mut state = self.write();
        state.current_user = None;
        state.notifications.clear();
    }

    pub fn set_current_user(&self, user: User) {
        self.write().current_user = Some(user);
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().current_user.clone()
    }

    /// Replaces the notification list. On failure the previous list is kept.
    pub async fn fetch_notifications(&self) {
        match self.notifications.list().await {
            Ok(notifications) => {
                debug!("Fetched {} notifications", notifications.len());
                self.write().notifications = notifications;
            }
            Err(e) => warn!("Failed to fetch notifications: {}", e),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.read().notifications.clone()
    }

    pub fn unread_notifications_count(&self) -> usize {
        self.read().notifications.iter().filter(|n| !n.read).count()
    }

    pub async fn mark_notification_read(&self, id: u64) -> Result<(), ApiError> {
        self.notifications.mark_read(id).await?;
        if let Some(notification) = self.write().notifications.iter_mut().find(|n| n.id == id) {
            notification.mark_read();
        }
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.notifications.mark_all_read().await?;
        self.write()
            .notifications
            .iter_mut()
            .for_each(Notification::mark_read);
        Ok(())
    }

    pub fn is_dark_theme(&self) -> bool {
        self.read().dark_theme
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_theme(&self) -> bool {
        let dark = !self.is_dark_theme();
        self.set_dark_theme(dark);
        dark
    }

    pub fn set_dark_theme(&self, dark: bool) {
        self.write().dark_theme = dark;
        let value = if dark { "dark" } else { "light" };
        if let Err(e) = self.storage.set(keys::THEME, value) {
            warn!("Failed to persist theme: {}", e);
        }
    }

    pub fn set_item_order(&self, wishlist_id: u64, item_ids: Vec<u64>) {
        let mut state = self.write();
        state.item_order.insert(wishlist_id, item_ids);
        match serde_json::to_string(&state.item_order) {
            Ok(encoded) => {
                if let Err(e) = self.storage.set(keys::ITEM_ORDER, &encoded) {
                    warn!("Failed to persist item order: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode item order: {}", e),
        }
    }

    /// The user's display order for a wishlist; empty when none was chosen.
    pub fn get_item_order(&self, wishlist_id: u64) -> Vec<u64> {
        self.read()
            .item_order
            .get(&wishlist_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn load_item_order(storage: &dyn KeyValueStore) -> HashMap<u64, Vec<u64>> {
    let Some(raw) = storage.get(keys::ITEM_ORDER) else {
        return HashMap::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring unreadable item order: {}", e);
        HashMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::models::NotificationKind;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// A notification source whose answers the test controls.
    #[derive(Default)]
    struct ScriptedSource {
        items: Mutex<Vec<Notification>>,
        failing: AtomicBool,
    }

    #[async_trait]
    impl NotificationSource for ScriptedSource {
        async fn list(&self) -> Result<Vec<Notification>, ApiError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ApiError::Unknown("503 Service Unavailable".to_string()));
            }
            Ok(self.items.lock().unwrap().clone())
        }

        async fn mark_read(&self, _id: u64) -> Result<(), ApiError> {
            Ok(())
        }

        async fn mark_all_read(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn notification(id: u64, read: bool) -> Notification {
        Notification {
            id,
            kind: NotificationKind::NewItem,
            target_id: 100 + id,
            read,
            created_at: Utc::now(),
        }
    }

    fn offline_store(
        storage: Arc<MemoryStore>,
        source: Arc<ScriptedSource>,
        prefers_dark: bool,
    ) -> AppStore {
        let client = Arc::new(ApiClient::with_http(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
        ));
        let auth = Arc::new(AuthService::new(client, storage.clone()));
        AppStore::new(auth, source, storage, prefers_dark)
    }

    #[tokio::test]
    async fn test_anonymous_initialization_ends_ready() {
        let store = offline_store(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedSource::default()),
            false,
        );
        assert_eq!(store.lifecycle(), Lifecycle::Uninitialized);

        store.initialize_app().await;

        assert!(store.is_initialized());
        assert!(!store.is_loading());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_unknown_item_order_is_empty() {
        let store = offline_store(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedSource::default()),
            false,
        );
        assert!(store.get_item_order(42).is_empty());
    }

    #[test]
    fn test_item_order_is_persisted() {
        let storage = Arc::new(MemoryStore::new());
        let store = offline_store(storage.clone(), Arc::new(ScriptedSource::default()), false);
        store.set_item_order(4, vec![11, 7, 9]);
        store.set_item_order(5, vec![1]);

        let reopened = offline_store(storage, Arc::new(ScriptedSource::default()), false);
        assert_eq!(reopened.get_item_order(4), vec![11, 7, 9]);
        assert_eq!(reopened.get_item_order(5), vec![1]);
    }

    #[test]
    fn test_theme_defaults_and_persists() {
        let storage = Arc::new(MemoryStore::new());
        let store = offline_store(storage.clone(), Arc::new(ScriptedSource::default()), true);
        assert!(store.is_dark_theme(), "Unset theme follows the system preference");

        assert!(!store.toggle_theme());
        assert_eq!(storage.get(keys::THEME).as_deref(), Some("light"));

        let reopened = offline_store(storage.clone(), Arc::new(ScriptedSource::default()), true);
        assert!(!reopened.is_dark_theme(), "Stored theme wins over the preference");

        reopened.set_dark_theme(true);
        assert_eq!(storage.get(keys::THEME).as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_stale_notifications() {
        let source = Arc::new(ScriptedSource::default());
        *source.items.lock().unwrap() = vec![notification(1, false), notification(2, true)];
        let store = offline_store(Arc::new(MemoryStore::new()), source.clone(), false);

        store.fetch_notifications().await;
        assert_eq!(store.notifications().len(), 2);
        assert_eq!(store.unread_notifications_count(), 1);

        source.failing.store(true, Ordering::SeqCst);
        store.fetch_notifications().await;
        assert_eq!(store.notifications().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_read_is_local_and_monotonic() {
        let source = Arc::new(ScriptedSource::default());
        *source.items.lock().unwrap() = vec![notification(1, false), notification(2, false)];
        let store = offline_store(Arc::new(MemoryStore::new()), source, false);
        store.fetch_notifications().await;

        store.mark_notification_read(1).await.unwrap();
        assert_eq!(store.unread_notifications_count(), 1);

        store.mark_all_notifications_read().await.unwrap();
        assert_eq!(store.unread_notifications_count(), 0);
        assert!(store.notifications().iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn test_logout_keeps_device_preferences() {
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::ACCESS_TOKEN, "a1").unwrap();
        let source = Arc::new(ScriptedSource::default());
        *source.items.lock().unwrap() = vec![notification(1, false)];
        let store = offline_store(storage.clone(), source, false);

        store.set_current_user(User {
            id: 1,
            username: "adam".to_string(),
            email: "adam@example.com".to_string(),
            profile_picture: None,
            bio: None,
            full_name: None,
        });
        store.fetch_notifications().await;
        store.set_item_order(4, vec![2, 1]);
        store.set_dark_theme(true);

        store.logout();
        store.logout();

        assert!(store.current_user().is_none());
        assert!(store.notifications().is_empty());
        assert_eq!(storage.get(keys::ACCESS_TOKEN), None);
        assert_eq!(store.get_item_order(4), vec![2, 1]);
        assert!(store.is_dark_theme());
    }
}
