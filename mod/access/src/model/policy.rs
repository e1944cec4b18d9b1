use serde::{Deserialize, Serialize};

use crate::model::Role;

/// Singleton policy at `settings/defaultRole`: the role assigned to a
/// user record the first time an identity is provisioned.
///
/// Falls back to `visitor` if absent and self-initializes on first read
/// (conditional write — see the role service).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultRolePolicy {
    pub role: Role,

    /// RFC 3339 timestamp of the last change.
    pub updated_at: String,
}

impl DefaultRolePolicy {
    /// The policy written when none has ever been set.
    pub fn fallback(updated_at: String) -> Self {
        Self {
            role: Role::Visitor,
            updated_at,
        }
    }
}
