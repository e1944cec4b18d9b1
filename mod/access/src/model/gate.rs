use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two independently gated areas of the legacy deployment mode.
///
/// Unlocking one never affects the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateScope {
    Video,
    Admin,
}

impl GateScope {
    /// Storage key of this scope's shared password document.
    pub fn storage_key(self) -> &'static str {
        match self {
            GateScope::Video => "settings/password",
            GateScope::Admin => "admin_settings/admin_password",
        }
    }
}

impl fmt::Display for GateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateScope::Video => "video",
            GateScope::Admin => "admin",
        };
        f.write_str(s)
    }
}

impl FromStr for GateScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(GateScope::Video),
            "admin" => Ok(GateScope::Admin),
            other => Err(format!("unknown gate scope: {other}")),
        }
    }
}

/// The shared gate password document, one per scope.
///
/// The value is a 4-digit numeral string compared in plaintext. This gate
/// is a low-value deterrent, not an access-control boundary; the
/// role-based mode is the real one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePassword {
    pub value: String,
}
