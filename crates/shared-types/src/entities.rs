//! # Core Domain Entities
//!
//! Identity types shared by every Domain Host subsystem.
//!
//! ## Clusters
//!
//! - **Domains**: `DomainId`
//! - **Components**: `ComponentIdentity`, `Version`, `PublicKeyToken`, `Component`
//! - **Resolution**: `ResolveKind`

use crate::errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: DOMAINS
// =============================================================================

/// Process-unique identifier of an execution domain.
///
/// Allocated by [`crate::process::DomainIdAllocator`]; never reused while the
/// owning process runs. Id `1` is always the default domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainId(pub u32);

impl DomainId {
    /// Id of the default domain (always created first).
    pub const DEFAULT: DomainId = DomainId(1);

    /// Raw numeric value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain#{}", self.0)
    }
}

// =============================================================================
// CLUSTER B: COMPONENTS
// =============================================================================

/// Four-part component version (`major.minor.build.revision`).
///
/// Missing trailing parts parse as zero, so `1.0` and `1.0.0.0` are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Version {
    /// Major part.
    pub major: u16,
    /// Minor part.
    pub minor: u16,
    /// Build part.
    pub build: u16,
    /// Revision part.
    pub revision: u16,
}

impl Version {
    /// Create a version from all four parts.
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl FromStr for Version {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(IdentityError::InvalidVersion(s.to_string()));
        }

        let mut values = [0u16; 4];
        for (slot, part) in values.iter_mut().zip(parts.iter()) {
            *slot = part
                .parse()
                .map_err(|_| IdentityError::InvalidVersion(s.to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Public key (or public key token) of a strongly named component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKeyToken(pub Vec<u8>);

impl PublicKeyToken {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for PublicKeyToken {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s.trim())
            .map(Self)
            .map_err(|_| IdentityError::InvalidPublicKey(s.to_string()))
    }
}

impl fmt::Display for PublicKeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Identity of a loadable component.
///
/// Used both for concrete identities (a loaded component) and for references
/// (a requested name), where unset fields act as wildcards. Display form:
/// `Name, Version=1.0.0.0, Culture=neutral, PublicKeyToken=0a1b2c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentIdentity {
    /// Simple name (compared case-insensitively).
    pub name: String,
    /// Version, if specified.
    pub version: Option<Version>,
    /// Culture, if specified (`neutral` is normalized to `None`).
    pub culture: Option<String>,
    /// Public key token, if strongly named.
    pub public_key_token: Option<PublicKeyToken>,
}

impl ComponentIdentity {
    /// Create an identity with only a simple name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            culture: None,
            public_key_token: None,
        }
    }

    /// Create a strong identity from name, public key and version.
    pub fn strong(name: impl Into<String>, key: PublicKeyToken, version: Version) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
            culture: None,
            public_key_token: Some(key),
        }
    }

    /// Set the version.
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the culture.
    #[must_use]
    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = normalize_culture(&culture.into());
        self
    }

    /// Set the public key token.
    #[must_use]
    pub fn with_public_key(mut self, key: PublicKeyToken) -> Self {
        self.public_key_token = Some(key);
        self
    }

    /// Exact identity equality on (name, public key, version).
    ///
    /// This is the full-trust allow-list comparison; culture is not part of it.
    pub fn same_strong_identity(&self, other: &ComponentIdentity) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            && self.public_key_token == other.public_key_token
            && self.version == other.version
    }

    /// Whether this concrete identity satisfies `reference`.
    ///
    /// Fields left unset in the reference match anything.
    pub fn satisfies(&self, reference: &ComponentIdentity) -> bool {
        if !self.name.eq_ignore_ascii_case(&reference.name) {
            return false;
        }
        if reference.version.is_some() && reference.version != self.version {
            return false;
        }
        if reference.public_key_token.is_some()
            && reference.public_key_token != self.public_key_token
        {
            return false;
        }
        match (&reference.culture, &self.culture) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
            (Some(_), None) => false,
        }
    }
}

fn normalize_culture(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("neutral") {
        None
    } else {
        Some(value.to_string())
    }
}

impl FromStr for ComponentIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let name = parts.next().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }

        let mut identity = ComponentIdentity::new(name);
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                return Err(IdentityError::MalformedAttribute(part.trim().to_string()));
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "version" => identity.version = Some(value.parse()?),
                "culture" => identity.culture = normalize_culture(value),
                "publickeytoken" | "publickey" => {
                    if !value.eq_ignore_ascii_case("null") {
                        identity.public_key_token = Some(value.parse()?);
                    }
                }
                other => {
                    return Err(IdentityError::MalformedAttribute(other.to_string()));
                }
            }
        }

        Ok(identity)
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            write!(f, ", Version={}", version)?;
        }
        match &self.culture {
            Some(culture) => write!(f, ", Culture={}", culture)?,
            None if self.version.is_some() => f.write_str(", Culture=neutral")?,
            None => {}
        }
        if let Some(key) = &self.public_key_token {
            write!(f, ", PublicKeyToken={}", key)?;
        }
        Ok(())
    }
}

/// A loadable component as seen by the resolution pipeline.
///
/// Carries the declared type and manifest-resource names so that a resolved
/// component can be verified against the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Resolved identity.
    pub identity: ComponentIdentity,
    /// Where the component was loaded from, if anywhere.
    pub location: Option<PathBuf>,
    /// Fully qualified names of the types it declares.
    pub types: BTreeSet<String>,
    /// Names of the manifest resources it carries.
    pub resources: BTreeSet<String>,
}

impl Component {
    /// Create a component with no types or resources.
    pub fn new(identity: ComponentIdentity) -> Self {
        Self {
            identity,
            location: None,
            types: BTreeSet::new(),
            resources: BTreeSet::new(),
        }
    }

    /// Create a component from a simple name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(ComponentIdentity::new(name))
    }

    /// Record the load location.
    #[must_use]
    pub fn at(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Declare a type.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.insert(type_name.into());
        self
    }

    /// Declare a manifest resource.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.insert(resource.into());
        self
    }

    /// Whether the component declares `type_name`.
    pub fn declares_type(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    /// Whether the component carries the manifest resource `resource`.
    pub fn has_resource(&self, resource: &str) -> bool {
        self.resources.contains(resource)
    }
}

// =============================================================================
// CLUSTER C: RESOLUTION
// =============================================================================

/// The three kinds of on-demand resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResolveKind {
    /// A component (module) reference could not be satisfied.
    Module,
    /// A type could not be found in the loaded components.
    Type,
    /// A manifest resource could not be found.
    Resource,
}

impl ResolveKind {
    /// All kinds, in a fixed order.
    pub const ALL: [ResolveKind; 3] = [ResolveKind::Module, ResolveKind::Type, ResolveKind::Resource];

    /// Stable lowercase label (used for metrics and logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Type => "type",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ResolveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => write!(f, "ModuleResolve"),
            Self::Type => write!(f, "TypeResolve"),
            Self::Resource => write!(f, "ResourceResolve"),
        }
    }
}
