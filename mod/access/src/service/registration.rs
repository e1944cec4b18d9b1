use thiserror::Error;

use vidgate_core::now_rfc3339;

use crate::model::{Identity, RegisterRequest, Registration, Role, UserRecord};
use crate::provider::{IdentityProvider, IssuedToken, ProviderError};
use crate::service::{AccessError, AccessService, user_key};

/// Failure of the two-phase registration protocol.
///
/// Phase 1 creates the identity at the provider; phase 2 provisions the
/// user record in the store. Each variant records which phase failed and
/// whether the compensating identity delete ran — so the orphaned-identity
/// state is representable, not just logged.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Phase 1 failed; nothing was created anywhere.
    #[error("{0}")]
    IdentityRejected(ProviderError),

    /// Phase 2 failed and the compensating delete removed the identity.
    /// The system holds no trace of the attempted account.
    #[error("registration rolled back: {cause}")]
    RolledBack { cause: AccessError },

    /// Phase 2 failed and the compensating delete also failed. The
    /// identity exists with no user record and needs manual cleanup.
    #[error("orphaned identity {identity_id}: {cause}; compensating delete failed: {compensation}")]
    Orphaned {
        identity_id: String,
        cause: AccessError,
        compensation: ProviderError,
    },
}

impl From<RegisterError> for vidgate_core::ServiceError {
    fn from(e: RegisterError) -> Self {
        match e {
            RegisterError::IdentityRejected(cause) => AccessError::from(cause).into(),
            RegisterError::RolledBack { cause } => cause.into(),
            orphaned @ RegisterError::Orphaned { .. } => {
                vidgate_core::ServiceError::PartialFailure(orphaned.to_string())
            }
        }
    }
}

/// Trim a submitted Discord id; empty after trimming counts as absent.
pub(crate) fn normalize_discord_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl AccessService {
    /// Create an account and its user record as one logical transaction.
    ///
    /// On success there is exactly one identity and exactly one user
    /// record sharing the same id. On a phase-2 failure the identity
    /// created in phase 1 is deleted again before the failure is
    /// reported; if that compensating delete fails too, the result is
    /// [`RegisterError::Orphaned`] — surfaced to the administrator, never
    /// retried automatically.
    pub fn register(&self, req: RegisterRequest) -> Result<Registration, RegisterError> {
        let discord_id = normalize_discord_id(req.discord_id.as_deref());

        // Phase 1 — identity.
        let identity = self
            .provider
            .create_account(&req.email, &req.password)
            .map_err(RegisterError::IdentityRejected)?;

        // Phase 2 — user record.
        match self.provision_record(&identity, discord_id) {
            Ok(role) => Ok(Registration { identity, role }),
            Err(cause) => Err(self.compensate(identity, cause)),
        }
    }

    fn provision_record(
        &self,
        identity: &Identity,
        discord_id: Option<String>,
    ) -> Result<Role, AccessError> {
        let role = self.default_role()?;
        let now = now_rfc3339();
        let record = UserRecord {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role,
            discord_id,
            created_at: now.clone(),
            updated_at: now,
        };
        self.write_doc(&user_key(&identity.id), &record)?;
        Ok(role)
    }

    fn compensate(&self, identity: Identity, cause: AccessError) -> RegisterError {
        tracing::warn!(
            identity = %identity.id,
            error = %cause,
            "user record provisioning failed, deleting identity"
        );
        match self.provider.delete_account(&identity.id) {
            Ok(()) => RegisterError::RolledBack { cause },
            Err(compensation) => {
                tracing::error!(
                    identity = %identity.id,
                    error = %compensation,
                    "compensating delete failed, identity is orphaned"
                );
                RegisterError::Orphaned {
                    identity_id: identity.id,
                    cause,
                    compensation,
                }
            }
        }
    }

    /// Authenticate against the provider and resolve the caller's role
    /// (provisioning lazily like any other first sight).
    pub fn login(&self, email: &str, password: &str) -> Result<(IssuedToken, Role), AccessError> {
        let issued = self.provider.authenticate(email, password)?;
        let role = self.resolve_role(&issued.identity.id)?;
        Ok((issued, role))
    }

    /// Ask the provider to deliver a password-reset message.
    pub fn reset_password(&self, email: &str) -> Result<(), AccessError> {
        self.provider.send_password_reset(email)?;
        Ok(())
    }
}
