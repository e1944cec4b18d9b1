//! Identity-provider collaborator seam.
//!
//! The access module does not own credentials, session tokens, or
//! password-reset delivery; it consumes them through this trait. The
//! concrete implementation is injected at startup. `MemoryIdentityProvider`
//! backs tests and single-node deployments.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

use vidgate_core::new_id;

use crate::model::Identity;

/// Identity-provider error type.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Account creation was refused (duplicate email, weak password, ...).
    #[error("identity-creation-failed: {0}")]
    CreationFailed(String),

    /// Email/password or bearer token did not match an account.
    #[error("invalid-credentials")]
    InvalidCredentials,

    /// No identity with the given id.
    #[error("identity not found: {0}")]
    NotFound(String),

    /// The provider itself could not be reached or errored.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// A session token issued by the provider on successful authentication,
/// together with the identity it belongs to.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub identity: Identity,
    pub token: String,
}

/// Operations the core consumes from the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Create a new account. Fails with `CreationFailed` if refused.
    fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;

    /// Authenticate with email + password; returns a session token.
    fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, ProviderError>;

    /// Delete an account. Used only as the compensating action when user
    /// record provisioning fails after account creation.
    fn delete_account(&self, identity_id: &str) -> Result<(), ProviderError>;

    /// Look up an identity by id. `Ok(None)` when no such account exists.
    fn lookup(&self, identity_id: &str) -> Result<Option<Identity>, ProviderError>;

    /// Resolve a bearer token to the identity it was issued for.
    fn resolve_token(&self, token: &str) -> Result<Identity, ProviderError>;

    /// Ask the provider to deliver a password-reset message.
    fn send_password_reset(&self, email: &str) -> Result<(), ProviderError>;
}

struct Account {
    email: String,
    password: String,
}

/// In-process identity provider.
///
/// Accounts, tokens, and the reset outbox live in memory; everything is
/// lost on restart. Suitable for tests and single-node deployments where
/// a real provider is not wired up.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, String>>,
    reset_outbox: Mutex<Vec<String>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test/inspection helper: is there an account with this email?
    pub fn account_exists(&self, email: &str) -> bool {
        let wanted = normalize_email(email);
        self.accounts
            .lock()
            .unwrap()
            .values()
            .any(|a| a.email == wanted)
    }

    /// Test/inspection helper: emails a reset message was requested for.
    pub fn reset_requests(&self) -> Vec<String> {
        self.reset_outbox.lock().unwrap().clone()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl IdentityProvider for MemoryIdentityProvider {
    fn create_account(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(ProviderError::CreationFailed("invalid email".into()));
        }
        if password.is_empty() {
            return Err(ProviderError::CreationFailed("empty password".into()));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.email == email) {
            return Err(ProviderError::CreationFailed("email already registered".into()));
        }

        let id = new_id();
        accounts.insert(
            id.clone(),
            Account {
                email: email.clone(),
                password: password.to_string(),
            },
        );
        Ok(Identity { id, email })
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, ProviderError> {
        let email = normalize_email(email);
        let accounts = self.accounts.lock().unwrap();
        let (id, account) = accounts
            .iter()
            .find(|(_, a)| a.email == email)
            .ok_or(ProviderError::InvalidCredentials)?;
        if account.password != password {
            return Err(ProviderError::InvalidCredentials);
        }

        let token = new_id();
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), id.clone());
        Ok(IssuedToken {
            identity: Identity {
                id: id.clone(),
                email: account.email.clone(),
            },
            token,
        })
    }

    fn delete_account(&self, identity_id: &str) -> Result<(), ProviderError> {
        let removed = self.accounts.lock().unwrap().remove(identity_id);
        if removed.is_none() {
            return Err(ProviderError::NotFound(identity_id.to_string()));
        }
        // Invalidate any tokens issued for the account.
        self.tokens
            .lock()
            .unwrap()
            .retain(|_, id| id != identity_id);
        Ok(())
    }

    fn lookup(&self, identity_id: &str) -> Result<Option<Identity>, ProviderError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(identity_id).map(|a| Identity {
            id: identity_id.to_string(),
            email: a.email.clone(),
        }))
    }

    fn resolve_token(&self, token: &str) -> Result<Identity, ProviderError> {
        let id = self
            .tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(ProviderError::InvalidCredentials)?;
        self.lookup(&id)?.ok_or(ProviderError::InvalidCredentials)
    }

    fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let email = normalize_email(email);
        if !self.account_exists(&email) {
            return Err(ProviderError::NotFound(email));
        }
        self.reset_outbox.lock().unwrap().push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_authenticate() {
        let provider = MemoryIdentityProvider::new();

        let identity = provider
            .create_account("Alice@Example.com", "hunter2")
            .unwrap();
        assert_eq!(identity.email, "alice@example.com");

        let issued = provider.authenticate("alice@example.com", "hunter2").unwrap();
        assert_eq!(issued.identity.id, identity.id);

        let resolved = provider.resolve_token(&issued.token).unwrap();
        assert_eq!(resolved.id, identity.id);

        assert!(matches!(
            provider.authenticate("alice@example.com", "wrong"),
            Err(ProviderError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_email_refused() {
        let provider = MemoryIdentityProvider::new();
        provider.create_account("a@example.com", "pw").unwrap();
        assert!(matches!(
            provider.create_account("a@example.com", "pw2"),
            Err(ProviderError::CreationFailed(_))
        ));
    }

    #[test]
    fn test_delete_invalidates_tokens() {
        let provider = MemoryIdentityProvider::new();
        let identity = provider.create_account("b@example.com", "pw").unwrap();
        let issued = provider.authenticate("b@example.com", "pw").unwrap();

        provider.delete_account(&identity.id).unwrap();
        assert!(provider.lookup(&identity.id).unwrap().is_none());
        assert!(provider.resolve_token(&issued.token).is_err());
        assert!(matches!(
            provider.delete_account(&identity.id),
            Err(ProviderError::NotFound(_))
        ));
    }

    #[test]
    fn test_password_reset_outbox() {
        let provider = MemoryIdentityProvider::new();
        provider.create_account("c@example.com", "pw").unwrap();

        provider.send_password_reset("c@example.com").unwrap();
        assert_eq!(provider.reset_requests(), vec!["c@example.com".to_string()]);

        assert!(provider.send_password_reset("nobody@example.com").is_err());
    }
}
