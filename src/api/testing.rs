//! Helpers for unit tests that need a fully wired client.

use std::sync::Arc;

use super::{ApiClient, BearerAuth, NavigationHistory, TokenRefresh, TokenRefresher};
use crate::storage::{keys, KeyValueStore, MemoryStore};

/// A client with the production chain (bearer, then refresh) pointed at `url`.
pub(crate) fn client_with_chain(
    url: &str,
    storage: Arc<MemoryStore>,
) -> (ApiClient, Arc<NavigationHistory>) {
    let history = Arc::new(NavigationHistory::new());
    let http = reqwest::Client::new();
    let refresher = Arc::new(TokenRefresher::new(
        http.clone(),
        url,
        storage.clone(),
        history.clone(),
        "/login",
    ));
    let client = ApiClient::with_http(http, url)
        .with_middleware(Arc::new(BearerAuth::new(storage)))
        .with_middleware(Arc::new(TokenRefresh::new(refresher)));
    (client, history)
}

pub(crate) fn seeded_storage(access: &str, refresh: &str) -> Arc<MemoryStore> {
    let storage = Arc::new(MemoryStore::new());
    storage.set(keys::ACCESS_TOKEN, access).unwrap();
    storage.set(keys::REFRESH_TOKEN, refresh).unwrap();
    storage
}
