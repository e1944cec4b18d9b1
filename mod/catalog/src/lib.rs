//! Catalog module — the video list and its categories.
//!
//! The two pieces of hard logic live in `service::classify` (pasted link
//! → typed reference + deterministic thumbnail) and `service::integrity`
//! (a category cannot be deleted while videos reference it; a video can
//! only be committed with an existing category). Every mutating call
//! consults the integrity checks before it writes.
//!
//! # Usage
//!
//! ```ignore
//! use catalog::CatalogModule;
//!
//! let module = CatalogModule::new(store, authenticator);
//! let router = module.routes(); // Mount under /catalog
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use vidgate_core::{Authenticator, Module};
use vidgate_kv::KVStore;

use crate::service::CatalogService;

/// Catalog module implementing the Module trait.
pub struct CatalogModule {
    service: Arc<CatalogService>,
    authenticator: Arc<dyn Authenticator>,
}

impl CatalogModule {
    /// Create a new CatalogModule with an injected authorization checker.
    pub fn new(store: Arc<dyn KVStore>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            service: CatalogService::new(store),
            authenticator,
        }
    }

    /// Get a reference to the underlying CatalogService.
    pub fn service(&self) -> &Arc<CatalogService> {
        &self.service
    }
}

impl Module for CatalogModule {
    fn name(&self) -> &str {
        "catalog"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.authenticator.clone())
    }
}
