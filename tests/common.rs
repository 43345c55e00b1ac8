use std::sync::Arc;

use giftsync::config::{parse_config, ConfigV1};
use giftsync::startup::build_context_with_storage;
use giftsync::state::AppContext;
use giftsync::storage::{keys, KeyValueStore, MemoryStore};

pub const PROFILE: &str = r#"{"id": 1, "username": "adam", "email": "adam@example.com"}"#;

pub fn config_for(base_url: &str) -> ConfigV1 {
    parse_config(&format!(
        r#"
version: "1.0.0"
api:
  base_url: "{}"
  timeout_in_ms: 2000
storage:
  type: memory
routes:
  login: "/login"
  home: "/"
  public: ["/forgot-password", "/reset-password/:uid/:token"]
"#,
        base_url
    ))
    .expect("test config should parse")
}

/// Builds a full context against `base_url`, returning the storage for inspection.
pub fn build_app(base_url: &str) -> (AppContext, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let context = build_context_with_storage(config_for(base_url), storage.clone())
        .expect("context should build");
    (context, storage)
}

pub fn seed_session(storage: &MemoryStore, access: &str, refresh: &str) {
    storage
        .set(keys::ACCESS_TOKEN, access)
        .expect("seed access token");
    storage
        .set(keys::REFRESH_TOKEN, refresh)
        .expect("seed refresh token");
}
