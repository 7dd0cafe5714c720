//! Concrete key and signing types for issuing access grants.
//!
//! An issuer identifies itself through a [`Principal`] (a `did:key`) and signs
//! credential payloads through an [`Authority`]. The only implementation
//! shipped here is [`Ed25519Signer`], whose public half is the
//! [`Ed25519Verifier`] used to check a grant's proof.

mod authority;
pub use authority::*;

mod error;
pub use error::*;

mod signer;
pub use signer::*;

mod verifier;
pub use verifier::*;
