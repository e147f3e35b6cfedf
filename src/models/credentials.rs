use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::User;

/// Username/password pair posted to `/auth/login`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Passwords must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a successful `/auth/login` response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}
