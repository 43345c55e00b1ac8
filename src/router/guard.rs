use std::sync::Arc;

use tracing::{debug, info, warn};

use super::routes::RouteTable;
use crate::storage::{keys, KeyValueStore};
use crate::store::AppStore;

/// The decision for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allowed { path: String },
    Redirected { from: String, to: String },
}

impl Navigation {
    /// Where the user ends up.
    pub fn destination(&self) -> &str {
        match self {
            Navigation::Allowed { path } => path,
            Navigation::Redirected { to, .. } => to,
        }
    }
}

/// Decides whether a navigation may proceed, based on the app store's session state.
pub struct RouterGuard {
    store: Arc<AppStore>,
    storage: Arc<dyn KeyValueStore>,
    routes: RouteTable,
}

impl RouterGuard {
    pub fn new(store: Arc<AppStore>, storage: Arc<dyn KeyValueStore>, routes: RouteTable) -> Self {
        Self {
            store,
            storage,
            routes,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Evaluates a navigation to `target`.
    ///
    /// Public routes pass straight through. Anything else waits for the store
    /// to finish initializing, then anonymous users are sent to the login page
    /// (remembering `target`) and signed-in users are kept off the login page.
    pub async fn navigate(&self, target: &str) -> Navigation {
        let is_login = self.routes.is_login(target);
        if self.routes.is_public(target) && !is_login {
            return Navigation::Allowed {
                path: target.to_string(),
            };
        }

        if !self.store.is_initialized() {
            debug!("Parking navigation to '{}' until the app is initialized", target);
            self.store.initialize_app().await;
        }

        match (self.store.current_user().is_some(), is_login) {
            (false, true) => Navigation::Allowed {
                path: target.to_string(),
            },
            (false, false) => {
                if let Err(e) = self.storage.set(keys::REDIRECT_PATH, target) {
                    warn!("Failed to remember redirect path '{}': {}", target, e);
                }
                info!("Anonymous navigation to '{}' redirected to login", target);
                Navigation::Redirected {
                    from: target.to_string(),
                    to: self.routes.login().to_string(),
                }
            }
            (true, true) => Navigation::Redirected {
                from: target.to_string(),
                to: self.routes.home().to_string(),
            },
            (true, false) => Navigation::Allowed {
                path: target.to_string(),
            },
        }
    }

    /// Returns (and forgets) the path a login interrupted.
    pub fn take_redirect_path(&self) -> Option<String> {
        let path = self.storage.get(keys::REDIRECT_PATH)?;
        if let Err(e) = self.storage.remove(keys::REDIRECT_PATH) {
            warn!("Failed to clear redirect path: {}", e);
        }
        Some(path).filter(|p| !p.is_empty() && !self.routes.is_login(p))
    }

    /// Where to go after a successful login: the interrupted path, or home.
    pub fn post_login_destination(&self) -> String {
        self.take_redirect_path()
            .unwrap_or_else(|| self.routes.home().to_string())
    }
}
