use std::sync::Mutex;

use tracing::info;

/// Something that can force the application onto another route.
///
/// The HTTP layer uses it to send the user back to the login page once a
/// session cannot be recovered.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Records every forced redirect. The CLI reports the last one and tests inspect them.
#[derive(Default)]
pub struct NavigationHistory {
    redirects: Mutex<Vec<String>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.redirects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

impl Navigator for NavigationHistory {
    fn redirect(&self, path: &str) {
        info!("Forcing navigation to '{}'", path);
        self.redirects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}
