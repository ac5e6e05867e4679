//! User and role models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A staff account on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The three fixed staff roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Waiter,
    Kitchen,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Waiter => "waiter",
            UserRole::Kitchen => "kitchen",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "waiter" => Some(UserRole::Waiter),
            "kitchen" => Some(UserRole::Kitchen),
            _ => None,
        }
    }

    /// Admins can do everything the other roles can
    pub fn can_act_as(&self, required: UserRole) -> bool {
        *self == UserRole::Admin || *self == required
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Waiter, UserRole::Kitchen] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("garson"), None);
    }

    #[test]
    fn test_admin_acts_as_any_role() {
        assert!(UserRole::Admin.can_act_as(UserRole::Kitchen));
        assert!(UserRole::Admin.can_act_as(UserRole::Waiter));
        assert!(!UserRole::Waiter.can_act_as(UserRole::Kitchen));
        assert!(UserRole::Kitchen.can_act_as(UserRole::Kitchen));
    }
}
