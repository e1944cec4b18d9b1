use std::sync::Mutex;

use crate::model::{GatePassword, GateScope};
use crate::service::{AccessError, AccessService};

type Observer = Box<dyn Fn(GateScope) + Send + Sync>;

#[derive(Default)]
struct Flags {
    video: bool,
    admin: bool,
}

/// Legacy-mode session state: one unlocked flag per gated area, scoped to
/// this gate instance's lifetime (one instance per session), plus an
/// in-process change signal — the observer callbacks exist because a
/// session-storage write does not raise a change event in the context
/// that performed it.
#[derive(Default)]
pub struct SessionGate {
    flags: Mutex<Flags>,
    observers: Mutex<Vec<Observer>>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a scope unlocked and notify observers.
    pub fn unlock(&self, scope: GateScope) {
        {
            let mut flags = self.flags.lock().unwrap();
            match scope {
                GateScope::Video => flags.video = true,
                GateScope::Admin => flags.admin = true,
            }
        }
        for observer in self.observers.lock().unwrap().iter() {
            observer(scope);
        }
    }

    pub fn is_unlocked(&self, scope: GateScope) -> bool {
        let flags = self.flags.lock().unwrap();
        match scope {
            GateScope::Video => flags.video,
            GateScope::Admin => flags.admin,
        }
    }

    /// Relock both scopes (session end).
    pub fn reset(&self) {
        *self.flags.lock().unwrap() = Flags::default();
    }

    /// Register an unlock observer for the lifetime of this gate.
    pub fn subscribe(&self, observer: impl Fn(GateScope) + Send + Sync + 'static) {
        self.observers.lock().unwrap().push(Box::new(observer));
    }
}

fn is_four_digit(value: &str) -> bool {
    value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit())
}

impl AccessService {
    /// Compare a supplied value against the stored gate password for a
    /// scope (exact, case-sensitive match) and unlock the scope on match.
    ///
    /// Returns whether the scope is now unlocked by this attempt. An unset
    /// password never matches.
    pub fn check_gate(&self, scope: GateScope, supplied: &str) -> Result<bool, AccessError> {
        let stored: Option<GatePassword> = self.read_doc(scope.storage_key())?;
        let matched = stored.map(|p| p.value == supplied).unwrap_or(false);
        if matched {
            self.gate().unlock(scope);
        }
        Ok(matched)
    }

    /// Overwrite the stored gate password for a scope.
    ///
    /// The value must be a 4-digit numeral string; anything else is
    /// rejected without touching the stored value.
    pub fn set_gate_password(&self, scope: GateScope, value: &str) -> Result<(), AccessError> {
        if !is_four_digit(value) {
            return Err(AccessError::Validation(
                "gate password must be a 4-digit number".into(),
            ));
        }
        self.write_doc(
            scope.storage_key(),
            &GatePassword {
                value: value.to_string(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use vidgate_kv::RedbStore;

    use crate::provider::MemoryIdentityProvider;
    use crate::service::{AccessConfig, AccessService};

    use super::*;

    fn test_service() -> Arc<AccessService> {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let store = Arc::new(RedbStore::open(tmp.path()).unwrap());
        let provider = Arc::new(MemoryIdentityProvider::new());
        AccessService::new(store, provider, AccessConfig::default())
    }

    #[test]
    fn test_scopes_are_independent() {
        let gate = SessionGate::new();

        gate.unlock(GateScope::Video);
        assert!(gate.is_unlocked(GateScope::Video));
        assert!(!gate.is_unlocked(GateScope::Admin));

        gate.reset();
        assert!(!gate.is_unlocked(GateScope::Video));
    }

    #[test]
    fn test_unlock_notifies_observers() {
        let gate = SessionGate::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        gate.subscribe(move |scope| {
            assert_eq!(scope, GateScope::Admin);
            seen2.fetch_add(1, Ordering::SeqCst);
        });

        gate.unlock(GateScope::Admin);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_check_gate() {
        let svc = test_service();

        // No password configured: nothing matches.
        assert!(!svc.check_gate(GateScope::Video, "1234").unwrap());

        svc.set_gate_password(GateScope::Video, "1234").unwrap();
        assert!(!svc.check_gate(GateScope::Video, "0000").unwrap());
        assert!(!svc.gate().is_unlocked(GateScope::Video));

        assert!(svc.check_gate(GateScope::Video, "1234").unwrap());
        assert!(svc.gate().is_unlocked(GateScope::Video));
        // The admin scope stays locked.
        assert!(!svc.gate().is_unlocked(GateScope::Admin));
    }

    #[test]
    fn test_set_gate_password_validation() {
        let svc = test_service();
        svc.set_gate_password(GateScope::Admin, "4321").unwrap();

        for bad in ["123", "12345", "12a4", "abcd", ""] {
            assert!(matches!(
                svc.set_gate_password(GateScope::Admin, bad),
                Err(AccessError::Validation(_))
            ));
        }

        // The rejected values did not overwrite the stored password.
        assert!(svc.check_gate(GateScope::Admin, "4321").unwrap());
    }
}
