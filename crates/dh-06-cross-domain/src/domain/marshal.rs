//! # Marshaling
//!
//! How values are copied across a domain boundary.
//!
//! | Value | Encoding |
//! |-------|----------|
//! | `GrantSet`, `PermissionSet`, `TrustEvidence` | security XML |
//! | everything else | generic binary (`bincode`) |
//!
//! Nothing is shared by reference: every value is encoded to owned bytes on
//! one side and decoded into a fresh value on the other.

use dh_02_trust::{GrantSet, PermissionSet, SecurityEncodable, TrustEvidence};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::PayloadEncoding;
use thiserror::Error;

/// Encoding or decoding a cross-domain value failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Marshal error ({encoding:?}): {message}")]
pub struct MarshalError {
    /// The encoding that failed.
    pub encoding: PayloadEncoding,
    /// Serializer message.
    pub message: String,
}

impl MarshalError {
    pub(crate) fn binary(error: impl ToString) -> Self {
        Self {
            encoding: PayloadEncoding::Binary,
            message: error.to_string(),
        }
    }

    fn xml(error: impl ToString) -> Self {
        Self {
            encoding: PayloadEncoding::SecurityXml,
            message: error.to_string(),
        }
    }
}

/// A value that can be returned from another domain.
pub trait Marshal: Sized {
    /// Encoding used on the wire.
    const ENCODING: PayloadEncoding;

    /// Encode into owned bytes.
    fn marshal(&self) -> Result<Vec<u8>, MarshalError>;

    /// Decode a fresh value.
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError>;
}

/// Encode a serde value with the generic binary serializer.
pub fn to_binary<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, MarshalError> {
    bincode::serialize(value).map_err(MarshalError::binary)
}

/// Decode a serde value written by [`to_binary`].
pub fn from_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, MarshalError> {
    bincode::deserialize(bytes).map_err(MarshalError::binary)
}

// =============================================================================
// SECURITY OBJECTS
// =============================================================================

macro_rules! security_marshal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Marshal for $ty {
                const ENCODING: PayloadEncoding = PayloadEncoding::SecurityXml;

                fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
                    Ok(self.to_security_xml().into_bytes())
                }

                fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
                    let xml = std::str::from_utf8(bytes).map_err(MarshalError::xml)?;
                    <$ty>::from_security_xml(xml).map_err(MarshalError::xml)
                }
            }
        )*
    };
}

security_marshal!(GrantSet, PermissionSet, TrustEvidence);

// =============================================================================
// GENERIC BINARY
// =============================================================================

macro_rules! binary_marshal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Marshal for $ty {
                const ENCODING: PayloadEncoding = PayloadEncoding::Binary;

                fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
                    to_binary(self)
                }

                fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
                    from_binary(bytes)
                }
            }
        )*
    };
}

binary_marshal!(
    (),
    bool,
    u8,
    u16,
    u32,
    u64,
    usize,
    i32,
    i64,
    f64,
    String,
    shared_types::DomainId,
    shared_types::ComponentIdentity,
);

impl<T: Serialize + DeserializeOwned> Marshal for Vec<T> {
    const ENCODING: PayloadEncoding = PayloadEncoding::Binary;

    fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
        to_binary(self)
    }

    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        from_binary(bytes)
    }
}

impl<T: Serialize + DeserializeOwned> Marshal for Option<T> {
    const ENCODING: PayloadEncoding = PayloadEncoding::Binary;

    fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
        to_binary(self)
    }

    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        from_binary(bytes)
    }
}

/// Any serde value, sent with the generic binary serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binary<T>(pub T);

impl<T> Binary<T> {
    /// Unwrap the value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + DeserializeOwned> Marshal for Binary<T> {
    const ENCODING: PayloadEncoding = PayloadEncoding::Binary;

    fn marshal(&self) -> Result<Vec<u8>, MarshalError> {
        to_binary(&self.0)
    }

    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        from_binary(bytes).map(Binary)
    }
}
