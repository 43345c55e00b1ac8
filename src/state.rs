//! Shared application context.
//!
//! Everything the UI layer needs, built once at startup and passed around
//! explicitly instead of living in globals.

use std::sync::Arc;

use crate::api::{ApiClient, NavigationHistory};
use crate::auth::AuthService;
use crate::config::ConfigV1;
use crate::router::RouterGuard;
use crate::services::{FamiliesService, NotificationsService, UsersService, WishlistsService};
use crate::storage::KeyValueStore;
use crate::store::AppStore;

#[derive(Clone)]
pub struct AppContext {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Device-local persistent storage (session tokens, preferences).
    pub storage: Arc<dyn KeyValueStore>,
    /// The HTTP pipeline every service talks through.
    pub client: Arc<ApiClient>,
    /// Forced redirects issued by the HTTP layer when a session cannot be recovered.
    pub navigation: Arc<NavigationHistory>,
    pub auth: Arc<AuthService>,
    pub notifications: Arc<NotificationsService>,
    pub families: Arc<FamiliesService>,
    pub wishlists: Arc<WishlistsService>,
    pub users: Arc<UsersService>,
    pub store: Arc<AppStore>,
    pub guard: Arc<RouterGuard>,
}
