mod categories;
mod videos;

use std::sync::Arc;

use axum::Router;

use vidgate_core::Authenticator;

use crate::service::CatalogService;

/// Shared application state: the service plus the injected authorization
/// checker (role-based deployments gate writes on the admin role; legacy
/// deployments inject `AllowAll` and rely on the client-session gate).
#[derive(Clone)]
pub struct CatalogState {
    pub service: Arc<CatalogService>,
    pub authenticator: Arc<dyn Authenticator>,
}

/// Build the complete catalog API router.
///
/// All routes are relative — the caller nests them under `/catalog`.
pub fn build_router(service: Arc<CatalogService>, authenticator: Arc<dyn Authenticator>) -> Router {
    let state = CatalogState {
        service,
        authenticator,
    };

    let api = Router::new()
        .merge(videos::routes())
        .merge(categories::routes());

    Router::new().nest("/catalog", api).with_state(state)
}
