use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub name: Option<String>,         // display name
    pub email: String,                // trimmed, lowercased
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub avatar: String,               // empty when unset
    pub created_at: OffsetDateTime,   // creation timestamp
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("avatar", &self.avatar)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload; `password_hash` must already be hashed.
#[derive(Clone)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_json_hide_the_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: Some("Ada".into()),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            avatar: String::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        assert!(!format!("{user:?}").contains("argon2id"));
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("ada@example.com"));
    }
}
