use pod_credentials::{Ed25519DidFromStrError, SignError, VerifyError};
use thiserror::Error;
use url::Url;

use crate::ConsentPhase;

/// Errors raised by a consent session.
#[derive(Debug, Error)]
pub enum ConsentError {
    /// The action is not allowed in the session's current state.
    #[error("Cannot {action} while the consent session is {phase}")]
    InvalidTransition {
        /// The state the session is in.
        phase: ConsentPhase,
        /// What was attempted.
        action: &'static str,
    },

    /// The request has no purpose with this identifier.
    #[error("Unknown purpose: {0}")]
    UnknownPurpose(String),

    /// No requested purpose asks for this mode on this resource.
    #[error("Access {mode} to {resource} was not requested")]
    UnrequestedAccess {
        /// The resource being toggled.
        resource: Url,
        /// The mode being toggled.
        mode: pod_access::AccessMode,
    },

    /// An earlier submission was dropped before it completed. Its outcome
    /// is unknown, so the session cannot submit again; start a new one.
    #[error("A previous submission was abandoned before it completed")]
    SubmissionAbandoned,

    /// The consent-issuance service call failed. The session stays ready to
    /// submit again on explicit request.
    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    /// The caller's redirect target is not a usable URL.
    #[error("Invalid redirect target {target}: {source}")]
    Redirect {
        /// The target as supplied.
        target: String,
        /// Why it could not be used.
        source: url::ParseError,
    },
}

/// Errors from issuing an approval or a denial.
#[derive(Debug, Error)]
pub enum IssuanceError {
    /// The issuer could not be reached.
    #[error("Issuance request failed: {0}")]
    Request(String),

    /// The issuer answered with an error status.
    #[error("Issuer responded with HTTP {status}: {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason phrase or response body.
        reason: String,
    },

    /// The issuer's answer could not be understood.
    #[error("Malformed issuer response: {0}")]
    Response(String),

    /// The configured issuer endpoint is not a URL.
    #[error("Invalid issuer endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The credential could not be encoded.
    #[error("Failed to encode credential: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The credential could not be signed.
    #[error(transparent)]
    Signing(#[from] SignError),
}

impl From<reqwest::Error> for IssuanceError {
    fn from(error: reqwest::Error) -> Self {
        IssuanceError::Request(error.to_string())
    }
}

/// Reasons a signed credential fails verification.
#[derive(Debug, Error)]
pub enum CredentialVerificationError {
    /// The document is not a consent credential.
    #[error("Not a consent credential: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The credential carries no proof.
    #[error("Credential is not signed")]
    Unsigned,

    /// The proof uses a suite this crate does not verify.
    #[error("Unsupported proof type {0}")]
    UnsupportedProof(String),

    /// The verification method is not an Ed25519 `did:key`.
    #[error("Invalid verification method: {0}")]
    VerificationMethod(#[from] Ed25519DidFromStrError),

    /// The identifier does not match the credential's content.
    #[error("Credential identifier does not match its content")]
    Fingerprint,

    /// The signature does not verify.
    #[error(transparent)]
    Signature(#[from] VerifyError),
}
