//! Ed25519 DID principal and verifier.

use base58::{FromBase58, ToBase58};
use ed25519_dalek::Verifier as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::{Ed25519DidFromStrError, Principal, VerifyError};

/// Multicodec prefix for an Ed25519 public key.
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// An `Ed25519` `did:key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Verifier(pub ed25519_dalek::VerifyingKey);

impl From<ed25519_dalek::VerifyingKey> for Ed25519Verifier {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        Ed25519Verifier(key)
    }
}

impl Ed25519Verifier {
    /// Check `signature` over `payload`.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), VerifyError> {
        let signature = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;
        self.0
            .verify(payload, &signature)
            .map_err(|_| VerifyError::Mismatch)
    }
}

impl Principal for Ed25519Verifier {
    fn did(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Ed25519Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut raw = Vec::with_capacity(34);
        raw.extend_from_slice(&ED25519_MULTICODEC);
        raw.extend_from_slice(self.0.as_bytes());
        write!(f, "did:key:z{}", raw.to_base58())
    }
}

impl FromStr for Ed25519Verifier {
    type Err = Ed25519DidFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoded = s
            .strip_prefix("did:key:")
            .ok_or(Ed25519DidFromStrError::InvalidDidHeader)?;
        let b58 = encoded
            .strip_prefix('z')
            .ok_or(Ed25519DidFromStrError::MissingBase58Prefix)?;
        let raw = b58
            .from_base58()
            .map_err(|_| Ed25519DidFromStrError::InvalidKey)?;
        let raw: [u8; 34] = raw
            .as_slice()
            .try_into()
            .map_err(|_| Ed25519DidFromStrError::InvalidKey)?;
        if raw[..2] != ED25519_MULTICODEC {
            return Err(Ed25519DidFromStrError::InvalidKey);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&raw[2..]);
        let key = ed25519_dalek::VerifyingKey::from_bytes(&key)
            .map_err(|_| Ed25519DidFromStrError::InvalidKey)?;
        Ok(Ed25519Verifier(key))
    }
}

impl Serialize for Ed25519Verifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ed25519Verifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let did = String::deserialize(deserializer)?;
        did.parse().map_err(serde::de::Error::custom)
    }
}
