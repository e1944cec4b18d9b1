//! Role-based [`Authenticator`] implementation for other modules.
//!
//! The catalog module gates its endpoints through the shared
//! `vidgate_core::Authenticator` trait without depending on this crate;
//! the binary injects this checker in role-based deployments (and
//! `AllowAll` in legacy ones, where the gate lives in the client session).

use std::sync::Arc;

use axum::http::HeaderMap;

use vidgate_core::{Authenticator, ServiceError};

use crate::api::extract_bearer;
use crate::model::Role;
use crate::provider::IdentityProvider;
use crate::service::AccessService;

/// Checks `module:resource:action` permissions against the caller's
/// resolved role: `:read` actions need `subscriber`, everything else
/// needs `admin`.
pub struct RoleChecker {
    service: Arc<AccessService>,
}

impl RoleChecker {
    pub fn new(service: Arc<AccessService>) -> Self {
        Self { service }
    }

    fn required_role(permission: &str) -> Role {
        if permission.ends_with(":read") {
            Role::Subscriber
        } else {
            Role::Admin
        }
    }
}

impl Authenticator for RoleChecker {
    fn check(&self, headers: &HeaderMap, permission: &str) -> Result<(), ServiceError> {
        let token = extract_bearer(headers).ok_or_else(|| {
            ServiceError::Unauthenticated("missing authorization header".into())
        })?;
        let identity = self
            .service
            .provider()
            .resolve_token(token)
            .map_err(|e| ServiceError::Unauthenticated(e.to_string()))?;

        let role = self
            .service
            .resolve_role(&identity.id)
            .map_err(ServiceError::from)?;

        let required = Self::required_role(permission);
        if role >= required {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!(
                "{permission} requires the {required} role"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::HeaderValue;

    use vidgate_kv::RedbStore;

    use crate::provider::{IdentityProvider, MemoryIdentityProvider};
    use crate::service::AccessConfig;

    use super::*;

    fn checker() -> (RoleChecker, Arc<AccessService>, Arc<MemoryIdentityProvider>) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = Arc::new(RedbStore::open(tmp.path()).unwrap());
        let provider = Arc::new(MemoryIdentityProvider::new());
        let svc = AccessService::new(store, provider.clone(), AccessConfig::default());
        (RoleChecker::new(svc.clone()), svc, provider)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_missing_and_invalid_tokens() {
        let (checker, _, _) = checker();

        assert!(checker.check(&HeaderMap::new(), "catalog:videos:read").is_err());
        assert!(checker.check(&bearer("nope"), "catalog:videos:read").is_err());
    }

    #[test]
    fn test_role_thresholds() {
        let (checker, svc, provider) = checker();
        provider.create_account("a@example.com", "pw").unwrap();
        let issued = provider.authenticate("a@example.com", "pw").unwrap();
        let headers = bearer(&issued.token);

        // Default role is visitor: below both thresholds.
        assert!(checker.check(&headers, "catalog:videos:read").is_err());

        svc.set_role(&issued.identity.id, Role::Subscriber).unwrap();
        assert!(checker.check(&headers, "catalog:videos:read").is_ok());
        assert!(checker.check(&headers, "catalog:videos:write").is_err());

        svc.set_role(&issued.identity.id, Role::Admin).unwrap();
        assert!(checker.check(&headers, "catalog:videos:write").is_ok());
    }
}
