//! # `CrossDomainEnvelope`
//!
//! The wrapper for every payload that crosses a domain boundary.
//!
//! ## Properties
//!
//! - **Versioning**: every envelope carries a `version` for forward compatibility.
//! - **Correlation**: a request and its reply share one `correlation_id`.
//! - **Integrity**: the SHA-256 digest of the payload travels with it and is
//!   checked on arrival.
//! - **Value copy**: the payload is always an owned byte buffer; the two
//!   domains never share addressable memory.

use crate::entities::DomainId;
use crate::errors::EnvelopeError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// How the payload bytes were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadEncoding {
    /// Minimal structural XML tree (security-policy objects).
    SecurityXml,
    /// Generic binary object serializer.
    Binary,
}

/// Envelope for one cross-domain request or reply.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossDomainEnvelope {
    /// Protocol version.
    pub version: u16,

    /// Domain the payload comes from.
    pub source: DomainId,

    /// Domain the payload is addressed to.
    pub target: DomainId,

    /// Correlates a request with its reply.
    pub correlation_id: Uuid,

    /// Unix timestamp (seconds) at which the envelope was sealed.
    pub timestamp: u64,

    /// Encoding of `payload`.
    pub encoding: PayloadEncoding,

    /// SHA-256 digest of `payload`.
    #[serde_as(as = "Bytes")]
    pub checksum: [u8; 32],

    /// Encoded payload.
    pub payload: Vec<u8>,
}

impl CrossDomainEnvelope {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Seal a new request envelope.
    pub fn seal(
        source: DomainId,
        target: DomainId,
        encoding: PayloadEncoding,
        payload: Vec<u8>,
    ) -> Self {
        Self::seal_with_correlation(source, target, Uuid::new_v4(), encoding, payload)
    }

    /// Seal an envelope that answers `request`.
    pub fn reply_to(request: &CrossDomainEnvelope, encoding: PayloadEncoding, payload: Vec<u8>) -> Self {
        Self::seal_with_correlation(
            request.target,
            request.source,
            request.correlation_id,
            encoding,
            payload,
        )
    }

    fn seal_with_correlation(
        source: DomainId,
        target: DomainId,
        correlation_id: Uuid,
        encoding: PayloadEncoding,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            source,
            target,
            correlation_id,
            timestamp: unix_now(),
            encoding,
            checksum: digest(&payload),
            payload,
        }
    }

    /// Check version, routing and payload integrity on arrival at `receiver`.
    pub fn verify(&self, receiver: DomainId) -> Result<(), EnvelopeError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(EnvelopeError::UnsupportedVersion {
                received: self.version,
                supported: Self::CURRENT_VERSION,
            });
        }
        if self.target != receiver {
            return Err(EnvelopeError::Misrouted {
                expected: self.target.0,
                actual: receiver.0,
            });
        }
        if digest(&self.payload) != self.checksum {
            return Err(EnvelopeError::ChecksumMismatch {
                correlation_id: self.correlation_id.to_string(),
            });
        }
        Ok(())
    }
}

fn digest(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hasher.finalize().into()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_envelope_verifies() {
        let env = CrossDomainEnvelope::seal(DomainId(1), DomainId(2), PayloadEncoding::Binary, vec![1, 2, 3]);
        assert!(env.verify(DomainId(2)).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let mut env = CrossDomainEnvelope::seal(DomainId(1), DomainId(2), PayloadEncoding::Binary, vec![1, 2, 3]);
        env.payload.push(4);
        assert!(matches!(
            env.verify(DomainId(2)),
            Err(EnvelopeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_misrouted_envelope_rejected() {
        let env = CrossDomainEnvelope::seal(DomainId(1), DomainId(2), PayloadEncoding::Binary, vec![]);
        assert_eq!(
            env.verify(DomainId(3)),
            Err(EnvelopeError::Misrouted { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_reply_swaps_direction_and_keeps_correlation() {
        let request = CrossDomainEnvelope::seal(DomainId(1), DomainId(2), PayloadEncoding::Binary, vec![9]);
        let reply = CrossDomainEnvelope::reply_to(&request, PayloadEncoding::SecurityXml, b"<x/>".to_vec());
        assert_eq!(reply.source, DomainId(2));
        assert_eq!(reply.target, DomainId(1));
        assert_eq!(reply.correlation_id, request.correlation_id);
        assert!(reply.verify(DomainId(1)).is_ok());
    }
}
