use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A customer known to the backend. Orders embed a copy of this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Payload for `POST /users`.
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub name: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Name comparison used when matching a login name to an existing user.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
