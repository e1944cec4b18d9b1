use serde::{Deserialize, Serialize};

use crate::model::{Identity, Role};

/// Input for creating a new account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,

    /// Optional Discord id; surrounding whitespace is trimmed before
    /// storage, and an empty string after trimming counts as absent.
    #[serde(default)]
    pub discord_id: Option<String>,
}

/// Result of a successful registration: the provider-issued identity and
/// the role the new user record was provisioned with.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub identity: Identity,
    pub role: Role,
}
