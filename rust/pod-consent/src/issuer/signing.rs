use async_trait::async_trait;
use base58::{FromBase58, ToBase58};
use chrono::Utc;
use pod_common::{ConditionalSync, Fingerprint};
use pod_credentials::{Authority, ED25519_PROOF_TYPE, Ed25519Verifier};

use crate::{
    Approval, ConsentCredential, ConsentIssuer, CredentialVerificationError, Denial,
    DenialReceipt, IssuanceError, Proof, SignedGrant,
};

const ASSERTION_METHOD: &str = "assertionMethod";

/// Issues credentials signed by a local [`Authority`].
///
/// A credential's identifier is the `urn:blake3:` fingerprint of the signed
/// payload, so identical statements issued at the same instant get the same
/// identifier.
#[derive(Debug, Clone)]
pub struct SigningConsentIssuer<A> {
    authority: A,
}

impl<A> SigningConsentIssuer<A>
where
    A: Authority + ConditionalSync,
{
    /// An issuer signing with `authority`.
    pub fn new(authority: A) -> Self {
        Self { authority }
    }

    /// The signing authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    async fn sign(
        &self,
        mut credential: ConsentCredential,
    ) -> Result<(String, serde_json::Value), IssuanceError> {
        let did = self.authority.did();
        credential.issuer = Some(did.clone());

        let payload = credential.signing_payload()?;
        let signature = self.authority.sign(&payload).await?;
        let id = Fingerprint::hash(&payload).to_urn();

        credential.id = Some(id.clone());
        credential.proof = Some(Proof {
            kind: self.authority.proof_type().to_string(),
            verification_method: did,
            proof_purpose: ASSERTION_METHOD.to_string(),
            proof_value: format!("z{}", signature.to_base58()),
        });
        tracing::debug!(%id, "signed consent credential");

        Ok((id, serde_json::to_value(&credential)?))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<A> ConsentIssuer for SigningConsentIssuer<A>
where
    A: Authority + ConditionalSync,
{
    async fn approve(&self, approval: &Approval) -> Result<SignedGrant, IssuanceError> {
        let (id, credential) = self
            .sign(ConsentCredential::approval(approval, Utc::now()))
            .await?;
        Ok(SignedGrant { id, credential })
    }

    async fn deny(&self, denial: &Denial) -> Result<DenialReceipt, IssuanceError> {
        let (id, credential) = self
            .sign(ConsentCredential::denial(denial, Utc::now()))
            .await?;
        Ok(DenialReceipt { id, credential })
    }
}

/// Check a credential issued by a [`SigningConsentIssuer`] over an Ed25519
/// key: its identifier must match its content and its proof must verify
/// against the `did:key` it names.
pub fn verify_credential(
    document: &serde_json::Value,
) -> Result<ConsentCredential, CredentialVerificationError> {
    let credential: ConsentCredential = serde_json::from_value(document.clone())?;
    let proof = credential
        .proof
        .as_ref()
        .ok_or(CredentialVerificationError::Unsigned)?;
    if proof.kind != ED25519_PROOF_TYPE {
        return Err(CredentialVerificationError::UnsupportedProof(
            proof.kind.clone(),
        ));
    }

    let payload = credential.signing_payload()?;
    if credential.id.as_deref() != Some(Fingerprint::hash(&payload).to_urn().as_str()) {
        return Err(CredentialVerificationError::Fingerprint);
    }

    let verifier: Ed25519Verifier = proof.verification_method.parse()?;
    let signature = proof
        .proof_value
        .strip_prefix('z')
        .and_then(|encoded| encoded.from_base58().ok())
        .ok_or_else(|| {
            pod_credentials::VerifyError::Malformed("proof value is not base58btc".to_string())
        })?;
    verifier.verify(&payload, &signature)?;

    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConsentStatus;
    use pod_access::{AccessMode, AccessModes};
    use pod_credentials::{Ed25519Signer, Principal};
    use std::collections::BTreeMap;
    use testresult::TestResult;
    use url::Url;

    fn issuer() -> SigningConsentIssuer<Ed25519Signer> {
        SigningConsentIssuer::new(Ed25519Signer::import(&[7; 32]).unwrap())
    }

    fn approval() -> Approval {
        Approval {
            requester: "https://mockappurl.com/app#id".into(),
            purposes: vec!["https://example.com/SomeSpecificPurpose".into()],
            access: BTreeMap::from([(
                Url::parse("https://pod.example/alice/private/data/data-2").unwrap(),
                AccessModes::from([AccessMode::Read]),
            )]),
        }
    }

    #[tokio::test]
    async fn it_issues_verifiable_grants() -> TestResult {
        let issuer = issuer();
        let grant = issuer.approve(&approval()).await?;

        assert!(grant.id.starts_with("urn:blake3:"));
        let credential = verify_credential(&grant.credential)?;
        assert_eq!(credential.id.as_deref(), Some(grant.id.as_str()));
        assert_eq!(credential.issuer, Some(issuer.authority().did()));
        assert_eq!(
            credential.consent().has_status,
            ConsentStatus::ExplicitlyGiven
        );
        Ok(())
    }

    #[tokio::test]
    async fn it_issues_verifiable_denials() -> TestResult {
        let receipt = issuer()
            .deny(&Denial {
                requester: "https://mockappurl.com/app#id".into(),
            })
            .await?;

        let credential = verify_credential(&receipt.credential)?;
        assert_eq!(credential.consent().has_status, ConsentStatus::Denied);
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_tampered_grants() -> TestResult {
        let grant = issuer().approve(&approval()).await?;

        let mut tampered = grant.credential.clone();
        tampered["credentialSubject"]["providedConsent"]["isProvidedTo"] =
            serde_json::json!("https://mallory.example/#me");

        assert!(matches!(
            verify_credential(&tampered),
            Err(CredentialVerificationError::Fingerprint)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_a_signature_from_another_key() -> TestResult {
        let grant = issuer().approve(&approval()).await?;
        let other = Ed25519Signer::import(&[8; 32])?;

        let mut forged = grant.credential.clone();
        forged["proof"]["verificationMethod"] = serde_json::json!(other.did());

        assert!(matches!(
            verify_credential(&forged),
            Err(CredentialVerificationError::Signature(_))
        ));
        Ok(())
    }
}
