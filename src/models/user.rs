use serde::{Deserialize, Serialize};

/// The User struct is the profile the API returns for `/users/me/` and member listings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl User {
    /// Name to show in the UI: full name when the user set one, username otherwise.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_profile_with_optional_fields_missing() {
        let user: User =
            serde_json::from_str(r#"{"id": 7, "username": "adam", "email": "adam@example.com"}"#)
                .unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.profile_picture, None);
        assert_eq!(user.display_name(), "adam");
    }

    #[test]
    fn display_name_prefers_full_name() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "username": "eve", "email": "e@x.io", "full_name": "Eve Example", "bio": "", "profile_picture": null}"#,
        )
        .unwrap();
        assert_eq!(user.display_name(), "Eve Example");
    }
}
