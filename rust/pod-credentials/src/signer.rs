//! Ed25519 signer implementation.

use async_trait::async_trait;
use ed25519_dalek::Signer as _;
use serde::Serialize;

use crate::{Authority, Ed25519KeyError, Ed25519Verifier, Principal, SignError};

/// Proof suite name attached to signatures produced by [`Ed25519Signer`].
pub const ED25519_PROOF_TYPE: &str = "Ed25519Signature2020";

/// An `Ed25519` `did:key` signer.
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    did: Ed25519Verifier,
    key: ed25519_dalek::SigningKey,
}

impl From<ed25519_dalek::SigningKey> for Ed25519Signer {
    fn from(key: ed25519_dalek::SigningKey) -> Self {
        let did = Ed25519Verifier::from(key.verifying_key());
        Self { did, key }
    }
}

impl Ed25519Signer {
    /// Generate a new Ed25519 keypair from operating-system randomness.
    pub fn generate() -> Result<Self, Ed25519KeyError> {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).map_err(Ed25519KeyError::Rng)?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed).into())
    }

    /// Import a keypair from its 32 seed bytes.
    pub fn import(seed: &[u8]) -> Result<Self, Ed25519KeyError> {
        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| Ed25519KeyError::InvalidSeedLength(seed.len()))?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&seed).into())
    }

    /// Export the seed bytes.
    pub fn export(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// The public half of this signer.
    #[must_use]
    pub const fn verifier(&self) -> &Ed25519Verifier {
        &self.did
    }
}

impl std::fmt::Display for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.did)
    }
}

impl Principal for Ed25519Signer {
    fn did(&self) -> String {
        self.did.to_string()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Authority for Ed25519Signer {
    fn proof_type(&self) -> &'static str {
        ED25519_PROOF_TYPE
    }

    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignError> {
        Ok(self.key.sign(payload).to_bytes().to_vec())
    }
}

impl Serialize for Ed25519Signer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.did.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    fn test_signer(seed: u8) -> Ed25519Signer {
        Ed25519Signer::import(&[seed; 32]).unwrap()
    }

    #[tokio::test]
    async fn it_produces_signatures_its_verifier_accepts() -> TestResult {
        let signer = test_signer(42);
        let message = b"purpose-scoped grant";

        let signature = signer.sign(message).await?;
        signer.verifier().verify(message, &signature)?;
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_signature_over_other_payload() -> TestResult {
        let signer = test_signer(7);
        let signature = signer.sign(b"first").await?;

        assert!(signer.verifier().verify(b"second", &signature).is_err());
        Ok(())
    }

    #[test]
    fn it_round_trips_seed() {
        let signer = test_signer(3);
        let restored = Ed25519Signer::import(&signer.export()).unwrap();
        assert_eq!(restored.did(), signer.did());
    }

    #[test]
    fn it_rejects_short_seed() {
        assert!(matches!(
            Ed25519Signer::import(&[0u8; 16]),
            Err(Ed25519KeyError::InvalidSeedLength(16))
        ));
    }

    #[test]
    fn it_generates_distinct_keys() -> TestResult {
        let first = Ed25519Signer::generate()?;
        let second = Ed25519Signer::generate()?;
        assert_ne!(first.did(), second.did());
        Ok(())
    }

    #[test]
    fn it_serializes_as_did() -> TestResult {
        let signer = test_signer(1);
        let json = serde_json::to_string(&signer)?;
        assert_eq!(json, format!("\"{}\"", signer.did()));
        Ok(())
    }
}
