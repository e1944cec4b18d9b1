use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use vidgate_core::ServiceError;

use crate::api::AppState;
use crate::model::Identity;
use crate::provider::IdentityProvider;

/// Paths that don't require authentication. Handlers behind them still
/// re-check the caller's role where it matters.
const PUBLIC_PATHS: &[&str] = &[
    "/access/register",
    "/access/login",
    "/access/reset",
    "/access/gate/",
    "/access/authorize/",
];

/// The caller's identity, resolved from the bearer token. Present on
/// every request that passes the middleware; `None` on public paths hit
/// without (valid) credentials.
#[derive(Clone)]
pub struct CurrentIdentity(pub Option<Identity>);

/// Identity-extraction middleware.
///
/// Resolves `Authorization: Bearer <token>` through the identity provider
/// and stores the result as an Extension. Requests to non-public paths
/// without a resolvable identity are rejected here.
pub async fn identity_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let identity = extract_bearer(req.headers())
        .and_then(|token| svc.provider().resolve_token(token).ok());

    if identity.is_none() && !is_public_path(req.uri().path()) {
        return ServiceError::Unauthenticated("missing or invalid bearer token".into())
            .into_response();
    }

    req.extensions_mut().insert(CurrentIdentity(identity));
    next.run(req).await
}

/// Extract the Bearer token from the Authorization header.
pub fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Unwrap the middleware's identity extension, rejecting anonymous
/// callers on handlers that need one.
pub(crate) fn require_identity(current: &CurrentIdentity) -> Result<&Identity, ServiceError> {
    current
        .0
        .as_ref()
        .ok_or_else(|| ServiceError::Unauthenticated("authentication required".into()))
}

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS
        .iter()
        .any(|prefix| path.starts_with(prefix))
}
