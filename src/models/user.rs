use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A doctor known to the system. Identity is the email address handed
/// back by the auth provider; there is no local password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, name: &str, picture: Option<String>) -> Self {
        Self {
            id: email.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            picture,
            created_at: Utc::now(),
        }
    }
}

/// Public projection of a user returned to the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
        }
    }
}
