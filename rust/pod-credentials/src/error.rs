use thiserror::Error;

/// Error that can occur during signing operations.
#[derive(Debug, Error)]
pub enum SignError {
    /// The signing key is not available or cannot be used.
    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),

    /// An error occurred during the signing operation.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Errors from generating or importing an Ed25519 key.
#[derive(Debug, Error)]
pub enum Ed25519KeyError {
    /// The seed bytes have the wrong length (expected 32).
    #[error("expected 32 seed bytes, got {0}")]
    InvalidSeedLength(usize),

    /// Random number generation failed.
    #[error("RNG error: {0}")]
    Rng(getrandom::Error),
}

/// Errors from parsing an Ed25519 `did:key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Ed25519DidFromStrError {
    /// The string does not start with `did:key:`.
    #[error("not a did:key identifier")]
    InvalidDidHeader,

    /// The method-specific identifier lacks the base58btc `z` prefix.
    #[error("missing base58btc multibase prefix")]
    MissingBase58Prefix,

    /// The encoded bytes are not an Ed25519 public key.
    #[error("invalid Ed25519 public key")]
    InvalidKey,
}

/// Error returned when a signature does not verify.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The proof value could not be decoded.
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// The signature does not match the payload.
    #[error("signature mismatch")]
    Mismatch,
}
