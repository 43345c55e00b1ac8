//! Application wiring.
//!
//! Builds storage, the HTTP pipeline, the services, the app store and the
//! router guard from configuration, in dependency order.

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiClient, BearerAuth, NavigationHistory, TokenRefresh, TokenRefresher};
use crate::auth::AuthService;
use crate::config::ConfigV1;
use crate::error::ApiError;
use crate::router::{RouteTable, RouterGuard};
use crate::services::{FamiliesService, NotificationsService, UsersService, WishlistsService};
use crate::state::AppContext;
use crate::storage::{create_storage, KeyValueStore};
use crate::store::AppStore;

/// Builds the context with the storage backend named in the configuration.
pub fn build_context(config: ConfigV1) -> Result<AppContext, ApiError> {
    let storage = create_storage(&config.storage);
    build_context_with_storage(config, storage)
}

/// Builds the context around an existing storage backend.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_context_with_storage(
    config: ConfigV1,
    storage: Arc<dyn KeyValueStore>,
) -> Result<AppContext, ApiError> {
    let config = Arc::new(config);
    let navigation = Arc::new(NavigationHistory::new());

    let client = ApiClient::new(&config.api)?;
    let refresher = Arc::new(TokenRefresher::new(
        client.http().clone(),
        &config.api.base_url,
        storage.clone(),
        navigation.clone(),
        config.routes.login.clone(),
    ));
    // Bearer runs first on the way out, refresh first on the way back.
    let client = Arc::new(
        client
            .with_middleware(Arc::new(BearerAuth::new(storage.clone())))
            .with_middleware(Arc::new(TokenRefresh::new(refresher))),
    );

    let auth = Arc::new(AuthService::new(client.clone(), storage.clone()));
    let notifications = Arc::new(NotificationsService::new(client.clone()));
    let store = Arc::new(AppStore::new(
        auth.clone(),
        notifications.clone(),
        storage.clone(),
        config.ui.prefers_dark,
    ));
    let guard = Arc::new(RouterGuard::new(
        store.clone(),
        storage.clone(),
        RouteTable::from_config(&config.routes),
    ));

    info!(
        "Client ready for '{}' using {} storage",
        config.api.base_url,
        storage.name()
    );

    Ok(AppContext {
        families: Arc::new(FamiliesService::new(client.clone())),
        wishlists: Arc::new(WishlistsService::new(client.clone())),
        users: Arc::new(UsersService::new(client.clone())),
        config,
        storage,
        client,
        navigation,
        auth,
        notifications,
        store,
        guard,
    })
}
