use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use serde::Serialize;

use vidgate_core::GateMode;

use crate::model::{GateScope, Role};
use crate::service::session_gate::SessionGate;
use crate::service::{AccessError, AccessService};

/// A protected navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTarget {
    VideoLibrary,
    AdminConsole,
}

impl AccessTarget {
    /// Minimum role that may see this target in role-based mode.
    pub fn required_role(self) -> Role {
        match self {
            AccessTarget::VideoLibrary => Role::Subscriber,
            AccessTarget::AdminConsole => Role::Admin,
        }
    }

    /// Gate protecting this target in legacy mode.
    pub fn gate_scope(self) -> GateScope {
        match self {
            AccessTarget::VideoLibrary => GateScope::Video,
            AccessTarget::AdminConsole => GateScope::Admin,
        }
    }
}

impl fmt::Display for AccessTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessTarget::VideoLibrary => "videos",
            AccessTarget::AdminConsole => "admin",
        };
        f.write_str(s)
    }
}

impl FromStr for AccessTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "videos" => Ok(AccessTarget::VideoLibrary),
            "admin" => Ok(AccessTarget::AdminConsole),
            other => Err(format!("unknown target: {other}")),
        }
    }
}

/// Where a denied navigation is sent.
///
/// `Restricted` is a content page, not an error: the caller is logged in
/// but their role is below the target's requirement, so bouncing them to
/// the login gate would be wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    Login,
    Restricted,
    Gate(GateScope),
}

/// Authorization state for one navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzState {
    Pending,
    Authorized,
    Denied(Denial),
}

/// The signal a pending evaluation resolves with.
pub enum AuthzSignal<'a> {
    /// Role-based mode: the caller's resolved role, or None when no
    /// identity is present.
    Role(Option<Role>),
    /// Legacy mode: the caller's session gate.
    Legacy(&'a SessionGate),
}

/// Ticket for one in-flight evaluation of one target.
///
/// Completing a ticket whose target has since been re-entered or
/// abandoned yields no decision — a late-resolving check must not fire a
/// stale redirect.
#[must_use]
pub struct EvalTicket {
    target: AccessTarget,
    generation: u64,
}

/// Decides, per navigation target, whether to render, block, or redirect.
///
/// Decisions are recomputed from the supplied signal on every completion;
/// an `Authorized` outcome is never cached, so a role downgrade flips the
/// next evaluation immediately.
pub struct RouteAuthorizer {
    mode: GateMode,
    generations: Mutex<HashMap<AccessTarget, u64>>,
}

impl RouteAuthorizer {
    pub fn new(mode: GateMode) -> Self {
        Self {
            mode,
            generations: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> GateMode {
        self.mode
    }

    /// Start (or restart) evaluating a target. Any earlier ticket for the
    /// same target becomes stale.
    pub fn begin(&self, target: AccessTarget) -> EvalTicket {
        let mut generations = self.generations.lock().unwrap();
        let generation = generations.entry(target).or_insert(0);
        *generation += 1;
        EvalTicket {
            target,
            generation: *generation,
        }
    }

    /// Abandon any in-flight evaluation of a target (navigation away).
    pub fn cancel(&self, target: AccessTarget) {
        let mut generations = self.generations.lock().unwrap();
        *generations.entry(target).or_insert(0) += 1;
    }

    /// Invalidate every in-flight evaluation; the identity or role signal
    /// changed and each target must re-enter `Pending`.
    pub fn notify_identity_changed(&self) {
        let mut generations = self.generations.lock().unwrap();
        for generation in generations.values_mut() {
            *generation += 1;
        }
    }

    /// Resolve a pending evaluation. Returns None when the ticket is
    /// stale — the caller has moved on, discard the result.
    pub fn complete(&self, ticket: EvalTicket, signal: &AuthzSignal) -> Option<AuthzState> {
        {
            let generations = self.generations.lock().unwrap();
            let current = generations.get(&ticket.target).copied().unwrap_or(0);
            if current != ticket.generation {
                return None;
            }
        }
        Some(decide(ticket.target, signal))
    }
}

/// Pure decision over the current signal.
fn decide(target: AccessTarget, signal: &AuthzSignal) -> AuthzState {
    match signal {
        AuthzSignal::Role(None) => AuthzState::Denied(Denial::Login),
        AuthzSignal::Role(Some(role)) => {
            if *role >= target.required_role() {
                AuthzState::Authorized
            } else {
                AuthzState::Denied(Denial::Restricted)
            }
        }
        AuthzSignal::Legacy(gate) => {
            let scope = target.gate_scope();
            if gate.is_unlocked(scope) {
                AuthzState::Authorized
            } else {
                AuthzState::Denied(Denial::Gate(scope))
            }
        }
    }
}

impl AccessService {
    /// Evaluate a navigation target for the given caller, end to end:
    /// begins an evaluation, resolves the signal for the configured mode,
    /// and completes the ticket.
    ///
    /// In role-based mode the role resolution durably provisions a user
    /// record on first sight, so the answer is always backed by one.
    pub fn authorize(
        &self,
        target: AccessTarget,
        identity_id: Option<&str>,
    ) -> Result<AuthzState, AccessError> {
        let ticket = self.authorizer().begin(target);
        let state = match self.config.gate_mode {
            GateMode::RoleBased => {
                let role = match identity_id {
                    Some(id) => Some(self.resolve_role(id)?),
                    None => None,
                };
                self.authorizer().complete(ticket, &AuthzSignal::Role(role))
            }
            GateMode::Legacy => self
                .authorizer()
                .complete(ticket, &AuthzSignal::Legacy(self.gate().as_ref())),
        };
        // A concurrent re-entry consumed this evaluation; report Pending
        // and let the caller's next evaluation decide.
        Ok(state.unwrap_or(AuthzState::Pending))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use vidgate_kv::RedbStore;

    use crate::provider::{IdentityProvider, MemoryIdentityProvider};
    use crate::service::AccessConfig;

    use super::*;

    fn test_service(mode: GateMode) -> (Arc<AccessService>, Arc<MemoryIdentityProvider>) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = Arc::new(RedbStore::open(tmp.path()).unwrap());
        let provider = Arc::new(MemoryIdentityProvider::new());
        let svc = AccessService::new(store, provider.clone(), AccessConfig { gate_mode: mode });
        (svc, provider)
    }

    #[test]
    fn test_no_identity_redirects_to_login() {
        let (svc, _) = test_service(GateMode::RoleBased);
        for target in [AccessTarget::VideoLibrary, AccessTarget::AdminConsole] {
            assert_eq!(
                svc.authorize(target, None).unwrap(),
                AuthzState::Denied(Denial::Login)
            );
        }
    }

    #[test]
    fn test_insufficient_role_redirects_to_restricted_not_login() {
        let (svc, provider) = test_service(GateMode::RoleBased);
        let identity = provider.create_account("v@example.com", "pw").unwrap();
        // Default role is visitor — below the video library's requirement.
        assert_eq!(
            svc.authorize(AccessTarget::VideoLibrary, Some(&identity.id))
                .unwrap(),
            AuthzState::Denied(Denial::Restricted)
        );
    }

    #[test]
    fn test_role_upgrade_and_downgrade_apply_immediately() {
        let (svc, provider) = test_service(GateMode::RoleBased);
        let identity = provider.create_account("s@example.com", "pw").unwrap();
        svc.resolve_role(&identity.id).unwrap();

        svc.set_role(&identity.id, Role::Subscriber).unwrap();
        assert_eq!(
            svc.authorize(AccessTarget::VideoLibrary, Some(&identity.id))
                .unwrap(),
            AuthzState::Authorized
        );
        assert_eq!(
            svc.authorize(AccessTarget::AdminConsole, Some(&identity.id))
                .unwrap(),
            AuthzState::Denied(Denial::Restricted)
        );

        // No cached Authorized survives a downgrade.
        svc.set_role(&identity.id, Role::Visitor).unwrap();
        assert_eq!(
            svc.authorize(AccessTarget::VideoLibrary, Some(&identity.id))
                .unwrap(),
            AuthzState::Denied(Denial::Restricted)
        );
    }

    #[test]
    fn test_legacy_mode_denies_to_matching_gate() {
        let (svc, _) = test_service(GateMode::Legacy);

        assert_eq!(
            svc.authorize(AccessTarget::VideoLibrary, None).unwrap(),
            AuthzState::Denied(Denial::Gate(GateScope::Video))
        );

        svc.set_gate_password(GateScope::Video, "1234").unwrap();
        assert!(svc.check_gate(GateScope::Video, "1234").unwrap());

        assert_eq!(
            svc.authorize(AccessTarget::VideoLibrary, None).unwrap(),
            AuthzState::Authorized
        );
        // The admin area keeps its own gate.
        assert_eq!(
            svc.authorize(AccessTarget::AdminConsole, None).unwrap(),
            AuthzState::Denied(Denial::Gate(GateScope::Admin))
        );
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let authorizer = RouteAuthorizer::new(GateMode::RoleBased);

        let ticket = authorizer.begin(AccessTarget::VideoLibrary);
        authorizer.cancel(AccessTarget::VideoLibrary);
        assert!(
            authorizer
                .complete(ticket, &AuthzSignal::Role(Some(Role::Admin)))
                .is_none()
        );

        // Re-entering the target invalidates the earlier ticket only.
        let stale = authorizer.begin(AccessTarget::VideoLibrary);
        let fresh = authorizer.begin(AccessTarget::VideoLibrary);
        assert!(
            authorizer
                .complete(stale, &AuthzSignal::Role(Some(Role::Admin)))
                .is_none()
        );
        assert_eq!(
            authorizer.complete(fresh, &AuthzSignal::Role(Some(Role::Admin))),
            Some(AuthzState::Authorized)
        );
    }

    #[test]
    fn test_identity_change_invalidates_all_targets() {
        let authorizer = RouteAuthorizer::new(GateMode::RoleBased);

        let videos = authorizer.begin(AccessTarget::VideoLibrary);
        let admin = authorizer.begin(AccessTarget::AdminConsole);
        authorizer.notify_identity_changed();

        assert!(
            authorizer
                .complete(videos, &AuthzSignal::Role(Some(Role::Admin)))
                .is_none()
        );
        assert!(
            authorizer
                .complete(admin, &AuthzSignal::Role(Some(Role::Admin)))
                .is_none()
        );
    }
}
