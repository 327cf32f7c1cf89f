//! # Access Guards
//!
//! A guard is evaluated against the caller's grant on every read.

use dh_02_trust::{GrantSet, Permission};
use std::fmt;
use std::sync::Arc;

/// Predicate over a caller grant.
pub type GrantPredicate = Arc<dyn Fn(&GrantSet) -> bool + Send + Sync>;

/// Read guard attached to a store entry.
#[derive(Clone)]
pub enum AccessGuard {
    /// The caller's grant must allow this permission.
    Demand(Permission),
    /// The caller must be fully trusted.
    Unrestricted,
    /// The predicate must hold for the caller's grant.
    Predicate(GrantPredicate),
}

impl AccessGuard {
    /// Guard from a predicate.
    pub fn predicate<F>(check: F) -> Self
    where
        F: Fn(&GrantSet) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(check))
    }

    /// Whether `grant` passes the guard.
    pub fn check(&self, grant: &GrantSet) -> bool {
        match self {
            Self::Demand(permission) => grant.allows(permission),
            Self::Unrestricted => grant.is_unrestricted(),
            Self::Predicate(check) => check(grant),
        }
    }
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demand(permission) => f.debug_tuple("Demand").field(permission).finish(),
            Self::Unrestricted => f.write_str("Unrestricted"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Demand(permission) => write!(f, "demand {}", permission),
            Self::Unrestricted => f.write_str("unrestricted"),
            Self::Predicate(_) => f.write_str("predicate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_02_trust::PermissionSet;

    #[test]
    fn test_demand_guard() {
        let guard = AccessGuard::Demand(Permission::Reflection);
        assert!(guard.check(&GrantSet::Unrestricted));
        assert!(guard.check(&GrantSet::of([Permission::Reflection])));
        assert!(!guard.check(&GrantSet::nothing()));
    }

    #[test]
    fn test_unrestricted_guard() {
        let guard = AccessGuard::Unrestricted;
        assert!(guard.check(&GrantSet::Unrestricted));
        assert!(!guard.check(&GrantSet::Restricted(PermissionSet::new().with(Permission::Execution))));
    }

    #[test]
    fn test_predicate_guard() {
        let guard = AccessGuard::predicate(|grant| grant.allows(&Permission::Execution));
        assert!(guard.check(&GrantSet::of([Permission::Execution])));
        assert!(!guard.check(&GrantSet::nothing()));
        assert_eq!(guard.to_string(), "predicate");
    }
}
