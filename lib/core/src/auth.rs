//! Authorization trait shared across modules.
//!
//! A module that needs its endpoints gated does NOT depend on the access
//! module. It only knows this trait; the concrete implementation is
//! injected at startup time.

use axum::http::HeaderMap;

use crate::ServiceError;

/// Pluggable authorization check, called by gated endpoints.
///
/// The check receives the request headers (for extracting credentials)
/// and a permission string like `catalog:videos:write`.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticate a request and check the given permission.
    ///
    /// - `headers`: the HTTP request headers
    /// - `permission`: a `module:resource:action` string
    /// - Returns `Ok(())` if allowed, `Err(ServiceError)` if denied.
    fn check(&self, headers: &HeaderMap, permission: &str) -> Result<(), ServiceError>;
}

/// A no-op authenticator that allows everything. Used for testing and for
/// legacy-gate deployments, where the shared password gate lives in the
/// client session and the API carries no per-request credentials.
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn check(&self, _headers: &HeaderMap, _permission: &str) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// An authenticator that denies everything. Used for testing.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn check(&self, _headers: &HeaderMap, _permission: &str) -> Result<(), ServiceError> {
        Err(ServiceError::PermissionDenied("access denied".into()))
    }
}
