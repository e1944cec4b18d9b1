pub mod authorizer;
pub mod deletion;
pub mod registration;
pub mod roles;
pub mod session_gate;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use vidgate_core::GateMode;
use vidgate_kv::{KVError, KVStore};

use crate::provider::{IdentityProvider, ProviderError};
use crate::service::authorizer::RouteAuthorizer;
use crate::service::session_gate::SessionGate;

/// Access service error type.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("upstream: {0}")]
    Upstream(String),

    #[error("partial failure: {0}")]
    Partial(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AccessError> for vidgate_core::ServiceError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::NotFound(m) => vidgate_core::ServiceError::NotFound(m),
            AccessError::Conflict(m) => vidgate_core::ServiceError::Conflict(m),
            AccessError::Validation(m) => vidgate_core::ServiceError::Validation(m),
            AccessError::Unauthenticated(m) => vidgate_core::ServiceError::Unauthenticated(m),
            AccessError::Forbidden(m) => vidgate_core::ServiceError::PermissionDenied(m),
            AccessError::Upstream(m) => vidgate_core::ServiceError::Upstream(m),
            AccessError::Partial(m) => vidgate_core::ServiceError::PartialFailure(m),
            AccessError::Storage(m) => vidgate_core::ServiceError::Storage(m),
            AccessError::Internal(m) => vidgate_core::ServiceError::Internal(m),
        }
    }
}

impl From<KVError> for AccessError {
    fn from(e: KVError) -> Self {
        AccessError::Storage(e.to_string())
    }
}

impl From<ProviderError> for AccessError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::CreationFailed(_) => AccessError::Upstream(e.to_string()),
            ProviderError::InvalidCredentials => AccessError::Unauthenticated(e.to_string()),
            ProviderError::NotFound(id) => AccessError::NotFound(format!("identity {id}")),
            ProviderError::Unavailable(m) => AccessError::Upstream(m),
        }
    }
}

// ── Storage layout ──────────────────────────────────────────────────

pub(crate) const DEFAULT_ROLE_KEY: &str = "settings/defaultRole";
pub(crate) const USERS_PREFIX: &str = "users/";

pub(crate) fn user_key(id: &str) -> String {
    format!("{USERS_PREFIX}{id}")
}

/// Configuration for the access service.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    /// Which gating strategy the route authorizer runs with.
    pub gate_mode: GateMode,
}

/// The access service. Holds the document store, the identity-provider
/// collaborator, and the in-process gate/authorizer state.
pub struct AccessService {
    pub(crate) store: Arc<dyn KVStore>,
    pub(crate) provider: Arc<dyn IdentityProvider>,
    pub(crate) config: AccessConfig,
    gate: Arc<SessionGate>,
    authorizer: RouteAuthorizer,
}

impl AccessService {
    pub fn new(
        store: Arc<dyn KVStore>,
        provider: Arc<dyn IdentityProvider>,
        config: AccessConfig,
    ) -> Arc<Self> {
        let authorizer = RouteAuthorizer::new(config.gate_mode);
        Arc::new(Self {
            store,
            provider,
            config,
            gate: Arc::new(SessionGate::new()),
            authorizer,
        })
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn gate(&self) -> &Arc<SessionGate> {
        &self.gate
    }

    pub fn authorizer(&self) -> &RouteAuthorizer {
        &self.authorizer
    }

    // ── JSON document helpers over the store ──

    /// Read and deserialize a document. `Ok(None)` when the key is absent.
    pub(crate) fn read_doc<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AccessError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let doc = serde_json::from_slice(&bytes)
                    .map_err(|e| AccessError::Internal(format!("corrupt document {key}: {e}")))?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Read a document that must exist.
    pub(crate) fn require_doc<T: DeserializeOwned>(
        &self,
        key: &str,
        what: &str,
    ) -> Result<T, AccessError> {
        self.read_doc(key)?
            .ok_or_else(|| AccessError::NotFound(what.to_string()))
    }

    /// Serialize and write a document, overwriting any existing value.
    pub(crate) fn write_doc<T: Serialize>(&self, key: &str, doc: &T) -> Result<(), AccessError> {
        let bytes =
            serde_json::to_vec(doc).map_err(|e| AccessError::Internal(e.to_string()))?;
        self.store.set(key, &bytes)?;
        Ok(())
    }

    /// Serialize and write a document only if the key is absent.
    /// Returns whether the write happened.
    pub(crate) fn write_doc_if_absent<T: Serialize>(
        &self,
        key: &str,
        doc: &T,
    ) -> Result<bool, AccessError> {
        let bytes =
            serde_json::to_vec(doc).map_err(|e| AccessError::Internal(e.to_string()))?;
        Ok(self.store.set_if_absent(key, &bytes)?)
    }
}
