use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - a registered author on the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// PHC-formatted password hash. Never a plaintext password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last", as shown next to posts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Replace the editable profile fields and bump `updated_at`.
    pub fn update_profile(&mut self, first_name: String, last_name: String, email: String) {
        self.first_name = first_name;
        self.last_name = last_name;
        self.email = email;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_bumps_timestamp() {
        let mut user = User::new(
            "admin".to_string(),
            "admin".to_string(),
            "admin@admin.com".to_string(),
            "$argon2id$stub".to_string(),
        );
        let created = user.created_at;

        user.update_profile(
            "Admin".to_string(),
            "One".to_string(),
            "admin@admin.com".to_string(),
        );

        assert_eq!(user.full_name(), "Admin One");
        assert_eq!(user.created_at, created);
        assert!(user.updated_at >= created);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "a".to_string(),
            "b".to_string(),
            "a@b.com".to_string(),
            "secret-hash".to_string(),
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("a@b.com"));
    }
}
