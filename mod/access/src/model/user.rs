use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Access level attached to a user record.
///
/// Ordered: `Visitor < Subscriber < Admin`. A screen that requires
/// `Subscriber` is open to subscribers and admins, closed to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Visitor,
    Subscriber,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Visitor => "visitor",
            Role::Subscriber => "subscriber",
            Role::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visitor" => Ok(Role::Visitor),
            "subscriber" => Ok(Role::Subscriber),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The durable role/profile record for one identity, stored at
/// `users/{id}` where `id` is the identity-provider id.
///
/// Created lazily the first time an identity is seen by an authorization
/// check, or eagerly during registration. Removed only by bulk deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identity-provider id; never differs from the storage key.
    pub id: String,

    /// Email address, copied from the identity at provisioning time.
    pub email: String,

    /// Current access level.
    pub role: Role,

    /// Linked Discord id, if the user supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Visitor < Role::Subscriber);
        assert!(Role::Subscriber < Role::Admin);
        assert!(Role::Admin >= Role::Subscriber);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Visitor, Role::Subscriber, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"subscriber\"").unwrap();
        assert_eq!(role, Role::Subscriber);
    }
}
