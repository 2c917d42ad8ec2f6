//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity from database.
///
/// Users are created on first successful phone verification and never
/// deleted. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Name shown to the client: username when set, phone otherwise.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(username: Option<&str>) -> User {
        User {
            id: 1,
            username: username.map(str::to_string),
            phone: "13800000000".to_string(),
            password_hash: "secret".to_string(),
            created_at: "2025-01-01 00:00:00".to_string(),
            updated_at: "2025-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_display_name_falls_back_to_phone() {
        assert_eq!(sample(Some("alice")).display_name(), "alice");
        assert_eq!(sample(None).display_name(), "13800000000");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(sample(None)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["phone"], "13800000000");
    }
}
