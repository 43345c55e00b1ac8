use serde::{Deserialize, Serialize};

use crate::storage::{keys, KeyValueStore};

/// Login credentials posted to `/token/`.
#[derive(Serialize, Deserialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The access/refresh pair returned by `/token/`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// A snapshot of the persisted session. The key-value store owns the real thing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        Self {
            access_token: storage.get(keys::ACCESS_TOKEN).filter(|t| !t.is_empty()),
            refresh_token: storage.get(keys::REFRESH_TOKEN).filter(|t| !t.is_empty()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.access_token.is_some()
    }
}

impl From<&TokenPair> for Session {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: Some(pair.access.clone()),
            refresh_token: Some(pair.refresh.clone()),
        }
    }
}
