//! The consent credential both issuers produce.
//!
//! A credential states what the user consented to (or refused): the modes,
//! the resources, the purposes and who the consent is given to.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Approval, Denial};

/// JSON-LD context of verifiable credentials.
pub const CREDENTIALS_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Type every consent credential carries besides `VerifiableCredential`.
pub const ACCESS_GRANT_TYPE: &str = "SolidAccessGrant";

/// Whether consent was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentStatus {
    /// The user approved.
    #[serde(rename = "https://w3id.org/GConsent#ConsentStatusExplicitlyGiven")]
    ExplicitlyGiven,
    /// The user refused.
    #[serde(rename = "https://w3id.org/GConsent#ConsentStatusDenied")]
    Denied,
}

/// The consent statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvidedConsent {
    /// Granted modes as `acl:` terms.
    #[serde(default)]
    pub mode: Vec<String>,
    /// Approved or denied.
    pub has_status: ConsentStatus,
    /// Resources covered.
    #[serde(default)]
    pub for_personal_data: Vec<Url>,
    /// Purposes the consent is limited to.
    #[serde(default)]
    pub for_purpose: Vec<String>,
    /// WebID of the requester.
    pub is_provided_to: String,
}

/// Subject of a consent credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSubject {
    /// The consent statement.
    pub provided_consent: ProvidedConsent,
}

/// A data-integrity proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Proof suite.
    #[serde(rename = "type")]
    pub kind: String,
    /// `did:key` of the signer.
    pub verification_method: String,
    /// Always `assertionMethod`.
    pub proof_purpose: String,
    /// Multibase (base58btc) signature.
    pub proof_value: String,
}

/// A consent credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentCredential {
    /// JSON-LD contexts.
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    /// Identifier, assigned by the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Credential types.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    /// Issuer DID, assigned by the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// RFC 3339 issuance time.
    pub issuance_date: String,
    /// The consent statement.
    pub credential_subject: ConsentSubject,
    /// Proof, assigned by the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl ConsentCredential {
    fn new(consent: ProvidedConsent, issued: DateTime<Utc>) -> Self {
        Self {
            context: vec![CREDENTIALS_CONTEXT.to_string()],
            id: None,
            types: vec![
                "VerifiableCredential".to_string(),
                ACCESS_GRANT_TYPE.to_string(),
            ],
            issuer: None,
            issuance_date: issued.to_rfc3339_opts(SecondsFormat::Secs, true),
            credential_subject: ConsentSubject {
                provided_consent: consent,
            },
            proof: None,
        }
    }

    /// An unsigned credential recording an approval.
    pub fn approval(approval: &Approval, issued: DateTime<Utc>) -> Self {
        Self::new(
            ProvidedConsent {
                mode: approval
                    .modes()
                    .iter()
                    .map(|mode| mode.iri().to_string())
                    .collect(),
                has_status: ConsentStatus::ExplicitlyGiven,
                for_personal_data: approval.access.keys().cloned().collect(),
                for_purpose: approval.purposes.clone(),
                is_provided_to: approval.requester.clone(),
            },
            issued,
        )
    }

    /// An unsigned credential recording a denial.
    pub fn denial(denial: &Denial, issued: DateTime<Utc>) -> Self {
        Self::new(
            ProvidedConsent {
                mode: Vec::new(),
                has_status: ConsentStatus::Denied,
                for_personal_data: Vec::new(),
                for_purpose: Vec::new(),
                is_provided_to: denial.requester.clone(),
            },
            issued,
        )
    }

    /// The consent statement.
    pub fn consent(&self) -> &ProvidedConsent {
        &self.credential_subject.provided_consent
    }

    /// Bytes a signature covers: the credential without its `id` and `proof`.
    pub fn signing_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        let unsigned = ConsentCredential {
            id: None,
            proof: None,
            ..self.clone()
        };
        serde_json::to_vec(&unsigned)
    }
}
