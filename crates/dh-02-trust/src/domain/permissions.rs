//! # Permissions and Grant Sets
//!
//! A [`GrantSet`] is either unrestricted or a finite [`PermissionSet`].
//! File permissions cover sub-paths, so `FileRead(/srv/app)` allows reading
//! `/srv/app/bin/x.dll`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Wildcard accepted for `Network` and `Environment` grants.
pub const WILDCARD: &str = "*";

/// One capability a domain or component may hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    /// Run code at all.
    Execution,
    /// Read files under a path.
    FileRead(PathBuf),
    /// Write files under a path.
    FileWrite(PathBuf),
    /// Connect to a host (`*` for any).
    Network(String),
    /// Inspect non-public members.
    Reflection,
    /// Read an environment variable (`*` for any).
    Environment(String),
    /// Call native code.
    UnmanagedCode,
    /// Supply evidence for new domains.
    ControlEvidence,
    /// Create, configure and unload domains.
    ControlDomain,
}

impl Permission {
    /// Stable class name used in logs and security XML.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Execution => "Execution",
            Self::FileRead(_) => "FileRead",
            Self::FileWrite(_) => "FileWrite",
            Self::Network(_) => "Network",
            Self::Reflection => "Reflection",
            Self::Environment(_) => "Environment",
            Self::UnmanagedCode => "UnmanagedCode",
            Self::ControlEvidence => "ControlEvidence",
            Self::ControlDomain => "ControlDomain",
        }
    }

    /// Whether holding `self` satisfies a demand for `requested`.
    pub fn covers(&self, requested: &Permission) -> bool {
        match (self, requested) {
            (Self::FileRead(granted), Self::FileRead(wanted))
            | (Self::FileWrite(granted), Self::FileWrite(wanted)) => covers_path(granted, wanted),
            (Self::Network(granted), Self::Network(wanted)) => {
                granted == WILDCARD || granted.eq_ignore_ascii_case(wanted)
            }
            (Self::Environment(granted), Self::Environment(wanted)) => {
                granted == WILDCARD || granted == wanted
            }
            (granted, wanted) => granted == wanted,
        }
    }
}

fn covers_path(granted: &Path, wanted: &Path) -> bool {
    wanted.starts_with(granted)
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileRead(path) | Self::FileWrite(path) => {
                write!(f, "{}({})", self.class_name(), path.display())
            }
            Self::Network(value) | Self::Environment(value) => {
                write!(f, "{}({})", self.class_name(), value)
            }
            _ => f.write_str(self.class_name()),
        }
    }
}

/// A finite set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permission.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.permissions.insert(permission)
    }

    /// Builder-style add.
    #[must_use]
    pub fn with(mut self, permission: Permission) -> Self {
        self.permissions.insert(permission);
        self
    }

    /// Whether some member covers `requested`.
    pub fn allows(&self, requested: &Permission) -> bool {
        self.permissions.iter().any(|p| p.covers(requested))
    }

    /// Members in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Permissions allowed by both sets.
    ///
    /// Keeps the narrower of two overlapping file grants.
    pub fn intersect(&self, other: &PermissionSet) -> PermissionSet {
        let mut result = PermissionSet::new();
        for p in &self.permissions {
            if other.allows(p) {
                result.insert(p.clone());
            }
        }
        for p in &other.permissions {
            if self.allows(p) {
                result.insert(p.clone());
            }
        }
        result
    }

    /// Permissions allowed by either set.
    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        PermissionSet {
            permissions: self.permissions.union(&other.permissions).cloned().collect(),
        }
    }

    /// Whether every member is allowed by `other`.
    pub fn is_subset_of(&self, other: &PermissionSet) -> bool {
        self.permissions.iter().all(|p| other.allows(p))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.permissions.extend(iter);
    }
}

/// The resolved permissions of a domain or component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantSet {
    /// Full trust.
    Unrestricted,
    /// Exactly these permissions.
    Restricted(PermissionSet),
}

impl GrantSet {
    /// A grant with no permissions.
    pub fn nothing() -> Self {
        Self::Restricted(PermissionSet::new())
    }

    /// A grant of exactly `permissions`.
    pub fn of(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self::Restricted(permissions.into_iter().collect())
    }

    /// Whether this is full trust.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Whether a demand for `permission` succeeds.
    pub fn allows(&self, permission: &Permission) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(set) => set.allows(permission),
        }
    }

    /// Permissions held by both.
    pub fn intersect(&self, other: &GrantSet) -> GrantSet {
        match (self, other) {
            (Self::Unrestricted, g) | (g, Self::Unrestricted) => g.clone(),
            (Self::Restricted(a), Self::Restricted(b)) => Self::Restricted(a.intersect(b)),
        }
    }

    /// Permissions held by either.
    pub fn union(&self, other: &GrantSet) -> GrantSet {
        match (self, other) {
            (Self::Unrestricted, _) | (_, Self::Unrestricted) => Self::Unrestricted,
            (Self::Restricted(a), Self::Restricted(b)) => Self::Restricted(a.union(b)),
        }
    }

    /// Whether everything this grant allows, `other` allows too.
    pub fn is_subset_of(&self, other: &GrantSet) -> bool {
        match (self, other) {
            (_, Self::Unrestricted) => true,
            (Self::Unrestricted, Self::Restricted(_)) => false,
            (Self::Restricted(a), Self::Restricted(b)) => a.is_subset_of(b),
        }
    }
}

impl Default for GrantSet {
    fn default() -> Self {
        Self::nothing()
    }
}

impl fmt::Display for GrantSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => f.write_str("Unrestricted"),
            Self::Restricted(set) => {
                let names: Vec<String> = set.iter().map(ToString::to_string).collect();
                write!(f, "{{{}}}", names.join(", "))
            }
        }
    }
}
