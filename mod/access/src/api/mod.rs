mod accounts;
mod authorize;
mod gate;
mod middleware;
mod policy;
mod users;

use std::sync::Arc;

use axum::Router;

use crate::service::AccessService;

pub use middleware::{CurrentIdentity, extract_bearer};

/// Shared application state.
pub type AppState = Arc<AccessService>;

/// Build the complete access API router.
///
/// All routes are relative — the caller nests them under `/access`.
pub fn build_router(svc: Arc<AccessService>) -> Router {
    let api = Router::new()
        .merge(accounts::routes())
        .merge(users::routes())
        .merge(policy::routes())
        .merge(gate::routes())
        .merge(authorize::routes());

    Router::new()
        .nest("/access", api)
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::identity_middleware,
        ))
        .with_state(svc)
}
