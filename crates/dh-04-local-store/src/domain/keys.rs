//! # Well-Known Keys
//!
//! Keys that never live in the generic map: reads and writes go straight to
//! the domain's load context.

use std::fmt;
use std::str::FromStr;

/// Store keys backed by load context fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownKey {
    /// Application base path (sealed).
    ApplicationBase,
    /// Application name (sealed).
    ApplicationName,
    /// Dynamic base directory.
    DynamicBase,
    /// Shadow-copy directories.
    ShadowCopyDirectories,
    /// Configuration blob (sealed).
    ConfigurationBytes,
    /// Private search paths (sealed).
    PrivateBinPath,
    /// Shadow-copy cache path.
    CachePath,
}

impl WellKnownKey {
    /// Every well-known key.
    pub const ALL: [WellKnownKey; 7] = [
        WellKnownKey::ApplicationBase,
        WellKnownKey::ApplicationName,
        WellKnownKey::DynamicBase,
        WellKnownKey::ShadowCopyDirectories,
        WellKnownKey::ConfigurationBytes,
        WellKnownKey::PrivateBinPath,
        WellKnownKey::CachePath,
    ];

    /// The key string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationBase => "ApplicationBase",
            Self::ApplicationName => "ApplicationName",
            Self::DynamicBase => "DynamicBase",
            Self::ShadowCopyDirectories => "ShadowCopyDirectories",
            Self::ConfigurationBytes => "ConfigurationBytes",
            Self::PrivateBinPath => "PrivateBinPath",
            Self::CachePath => "CachePath",
        }
    }

    /// Recognize a key string. Matching is exact.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl FromStr for WellKnownKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("not a well-known key: {}", s))
    }
}

impl fmt::Display for WellKnownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
