//! Principal and Authority traits for issuer identity and signing.

use async_trait::async_trait;
use pod_common::ConditionalSend;

use crate::SignError;

/// A principal with a DID identity.
pub trait Principal {
    /// This principal's DID.
    fn did(&self) -> String;
}

/// An authority that can sign data.
///
/// Extends `Principal` with the ability to sign payloads. Signing is async so
/// that remote or hardware-backed keys fit behind the same trait.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Authority: Principal + ConditionalSend {
    /// Name of the proof suite the signatures belong to.
    fn proof_type(&self) -> &'static str;

    /// Sign the given payload.
    async fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, SignError>;
}
