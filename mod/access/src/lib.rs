//! Access module — who may see what, and how accounts come to exist.
//!
//! # Resources
//!
//! - **UserRecord** — durable role/profile record, keyed by identity id
//! - **DefaultRolePolicy** — role assigned on first sight of an identity
//! - **GatePassword** — legacy shared password, one per gated area
//!
//! # Components
//!
//! - role resolution with lazy, conditional-write provisioning
//! - two-phase registration with a compensating identity delete
//! - the legacy per-session gate and the role-based route authorizer,
//!   both behind one authorizer interface, selected by deployment mode
//! - atomic bulk deletion of user records
//!
//! # Usage
//!
//! ```ignore
//! use access::{AccessModule, service::AccessConfig};
//!
//! let module = AccessModule::new(store, provider, AccessConfig::default());
//! let router = module.routes(); // Mount under /access
//! ```

pub mod api;
pub mod checker;
pub mod model;
pub mod provider;
pub mod service;

use std::sync::Arc;

use axum::Router;

use vidgate_core::Module;
use vidgate_kv::KVStore;

use crate::provider::IdentityProvider;
use crate::service::{AccessConfig, AccessService};

/// Access module implementing the Module trait.
///
/// Holds the AccessService and provides HTTP routes for all access
/// endpoints.
pub struct AccessModule {
    service: Arc<AccessService>,
}

impl AccessModule {
    /// Create a new AccessModule.
    pub fn new(
        store: Arc<dyn KVStore>,
        provider: Arc<dyn IdentityProvider>,
        config: AccessConfig,
    ) -> Self {
        let service = AccessService::new(store, provider, config);
        Self { service }
    }

    /// Get a reference to the underlying AccessService.
    pub fn service(&self) -> &Arc<AccessService> {
        &self.service
    }
}

impl Module for AccessModule {
    fn name(&self) -> &str {
        "access"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
