//! # Domain State Machine
//!
//! ```text
//! [Created] ──trust resolved──→ [SecurityInitialized] ──initialized──→ [Active]
//!                                                                         │
//!                                                                  unload requested
//!                                                                         ↓
//!                                 [Unloaded] ←──drained, context stopped── [Unloading]
//! ```
//!
//! Transitions are strictly forward, one step at a time. `Unloaded` is
//! terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DomainState {
    /// Allocated; nothing resolved yet.
    Created,
    /// Trust resolved and stored.
    SecurityInitialized,
    /// Fully usable.
    Active,
    /// Refusing new work, draining in-flight work.
    Unloading,
    /// Terminal; every handle is invalid.
    Unloaded,
}

impl DomainState {
    /// The only state reachable from this one.
    pub fn next(&self) -> Option<DomainState> {
        match self {
            Self::Created => Some(Self::SecurityInitialized),
            Self::SecurityInitialized => Some(Self::Active),
            Self::Active => Some(Self::Unloading),
            Self::Unloading => Some(Self::Unloaded),
            Self::Unloaded => None,
        }
    }

    /// Whether `to` is the single legal successor.
    pub fn can_transition_to(&self, to: DomainState) -> bool {
        self.next() == Some(to)
    }

    /// Whether operations through a handle are allowed.
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the domain is going away or gone.
    pub fn is_terminating(&self) -> bool {
        matches!(self, Self::Unloading | Self::Unloaded)
    }
}

impl fmt::Display for DomainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
