use serde::{Deserialize, Serialize};

/// An account record owned by the external identity provider.
///
/// The core only ever reads identities; credential storage, session
/// tokens, and password-reset delivery stay with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque provider-issued id.
    pub id: String,

    /// Email the account was created with.
    pub email: String,
}
