use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role value that marks an administrator account.
pub const ADMIN_ROLE: &str = "administrador";

/// The User struct represents the account behind a session, as returned by
/// the API's login and `/auth/me` endpoints.
///
/// Only `id` is always expected; everything else is optional on the wire.
/// Fields we do not model are kept in `extra` so nothing sent by the server
/// gets lost.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// ISO-8601 timestamp exactly as the server sent it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Construct a new User with only an id and an optional role.
    pub fn new(id: i64, role: Option<&str>) -> Self {
        User {
            id,
            username: None,
            name: None,
            email: None,
            role: role.map(str::to_string),
            is_active: true,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// True iff the role field equals the administrator marker.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    /// A short label for logs: the username when known, otherwise the id.
    pub fn label(&self) -> String {
        match &self.username {
            Some(username) => username.clone(),
            None => format!("#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_user_deserializes() {
        let user: User = serde_json::from_value(json!({"id": 1, "role": "administrador"})).unwrap();
        assert_eq!(user, User::new(1, Some("administrador")));
        assert!(user.is_active);
        assert!(user.is_admin());
    }

    #[test]
    fn test_full_user_keeps_unknown_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "username": "maria",
            "name": "Maria Silva",
            "email": "maria@example.com",
            "role": "tecnico",
            "is_active": false,
            "created_at": "2024-03-01T10:00:00",
            "department": "field"
        }))
        .unwrap();

        assert_eq!(user.username.as_deref(), Some("maria"));
        assert!(!user.is_active);
        assert!(!user.is_admin());
        assert_eq!(user.extra.get("department"), Some(&json!("field")));
        assert_eq!(user.label(), "maria");

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["department"], "field");
        assert_eq!(back["created_at"], "2024-03-01T10:00:00");
    }

    #[test]
    fn test_is_admin_requires_exact_marker() {
        assert!(!User::new(1, None).is_admin());
        assert!(!User::new(1, Some("Administrador")).is_admin());
        assert!(!User::new(1, Some("admin")).is_admin());
        assert!(User::new(1, Some(ADMIN_ROLE)).is_admin());
    }

    #[test]
    fn test_label_falls_back_to_id() {
        assert_eq!(User::new(42, None).label(), "#42");
    }
}
