//! # Trust Evidence
//!
//! The facts a policy looks at: where code came from (zone, url, site), who
//! signed it (strong name) and what it hashes to.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::ComponentIdentity;
use std::fmt;
use std::str::FromStr;

/// Coarse origin of code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityZone {
    /// Local machine.
    MyComputer,
    /// Local network.
    Intranet,
    /// Explicitly trusted remote sites.
    Trusted,
    /// Anywhere else.
    Internet,
    /// Explicitly untrusted sites.
    Untrusted,
    /// No zone information.
    NoZone,
}

impl SecurityZone {
    /// Every zone, in declaration order.
    pub const ALL: [SecurityZone; 6] = [
        Self::MyComputer,
        Self::Intranet,
        Self::Trusted,
        Self::Internet,
        Self::Untrusted,
        Self::NoZone,
    ];

    /// Stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MyComputer => "MyComputer",
            Self::Intranet => "Intranet",
            Self::Trusted => "Trusted",
            Self::Internet => "Internet",
            Self::Untrusted => "Untrusted",
            Self::NoZone => "NoZone",
        }
    }
}

impl fmt::Display for SecurityZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecurityZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|zone| zone.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown zone '{s}'"))
    }
}

/// One typed piece of evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceItem {
    /// Origin zone.
    Zone(SecurityZone),
    /// Origin URL.
    Url(String),
    /// Origin site (host name).
    Site(String),
    /// Strong-name identity of the code.
    StrongName(ComponentIdentity),
    /// Hex SHA-256 of the code bytes.
    Hash(String),
    /// Host-defined evidence.
    Custom {
        /// Evidence type name.
        name: String,
        /// Opaque value.
        value: String,
    },
}

impl EvidenceItem {
    /// Hash evidence for a code image.
    pub fn hash_of(bytes: &[u8]) -> Self {
        Self::Hash(hex::encode(Sha256::digest(bytes)))
    }
}

/// An unordered collection of evidence items.
///
/// Equality ignores insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustEvidence {
    items: Vec<EvidenceItem>,
}

impl TrustEvidence {
    /// No evidence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Evidence consisting of a single zone.
    pub fn for_zone(zone: SecurityZone) -> Self {
        Self::empty().with(EvidenceItem::Zone(zone))
    }

    /// Builder-style add.
    #[must_use]
    pub fn with(mut self, item: EvidenceItem) -> Self {
        self.add(item);
        self
    }

    /// Add an item. At most one zone is kept; a new zone replaces the old.
    pub fn add(&mut self, item: EvidenceItem) {
        if matches!(item, EvidenceItem::Zone(_)) {
            self.items.retain(|i| !matches!(i, EvidenceItem::Zone(_)));
        }
        if !self.items.contains(&item) {
            self.items.push(item);
        }
    }

    /// All items.
    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    /// Whether there is no evidence at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The zone, or [`SecurityZone::NoZone`].
    pub fn zone(&self) -> SecurityZone {
        self.items
            .iter()
            .find_map(|i| match i {
                EvidenceItem::Zone(zone) => Some(*zone),
                _ => None,
            })
            .unwrap_or(SecurityZone::NoZone)
    }

    /// The first site, if any.
    pub fn site(&self) -> Option<&str> {
        self.items.iter().find_map(|i| match i {
            EvidenceItem::Site(site) => Some(site.as_str()),
            _ => None,
        })
    }

    /// The first URL, if any.
    pub fn url(&self) -> Option<&str> {
        self.items.iter().find_map(|i| match i {
            EvidenceItem::Url(url) => Some(url.as_str()),
            _ => None,
        })
    }

    /// The strong-name identity, if any.
    pub fn strong_name(&self) -> Option<&ComponentIdentity> {
        self.items.iter().find_map(|i| match i {
            EvidenceItem::StrongName(identity) => Some(identity),
            _ => None,
        })
    }
}

impl PartialEq for TrustEvidence {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().all(|item| other.items.contains(item))
    }
}

impl Eq for TrustEvidence {}

impl FromIterator<EvidenceItem> for TrustEvidence {
    fn from_iter<I: IntoIterator<Item = EvidenceItem>>(iter: I) -> Self {
        let mut evidence = Self::empty();
        for item in iter {
            evidence.add(item);
        }
        evidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_defaults_to_no_zone() {
        assert_eq!(TrustEvidence::empty().zone(), SecurityZone::NoZone);
        assert_eq!(
            TrustEvidence::for_zone(SecurityZone::Internet).zone(),
            SecurityZone::Internet
        );
    }

    #[test]
    fn test_single_zone_kept() {
        let evidence = TrustEvidence::for_zone(SecurityZone::Internet)
            .with(EvidenceItem::Zone(SecurityZone::Intranet));
        assert_eq!(evidence.zone(), SecurityZone::Intranet);
        assert_eq!(evidence.len(), 1);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: TrustEvidence = vec![
            EvidenceItem::Site("example.com".into()),
            EvidenceItem::Zone(SecurityZone::Internet),
        ]
        .into_iter()
        .collect();
        let b = TrustEvidence::for_zone(SecurityZone::Internet)
            .with(EvidenceItem::Site("example.com".into()));
        assert_eq!(a, b);
        assert_eq!(a.site(), Some("example.com"));
    }

    #[test]
    fn test_zone_from_str() {
        assert_eq!("intranet".parse::<SecurityZone>().unwrap(), SecurityZone::Intranet);
        assert!("moon".parse::<SecurityZone>().is_err());
    }

    #[test]
    fn test_hash_evidence() {
        let EvidenceItem::Hash(digest) = EvidenceItem::hash_of(b"abc") else {
            panic!("expected hash evidence");
        };
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
