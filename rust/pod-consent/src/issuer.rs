//! The boundary to the consent-issuance service.
//!
//! The session makes exactly one call per submission through a
//! [`ConsentIssuer`]: [`ConsentIssuer::approve`] or [`ConsentIssuer::deny`].
//! Two implementations ship here: [`HttpConsentIssuer`] posts to a remote
//! service, [`SigningConsentIssuer`] signs locally with an [`Authority`].
//!
//! [`Authority`]: pod_credentials::Authority

mod http;
pub use http::*;

mod signing;
pub use signing::*;

use async_trait::async_trait;
use pod_access::AccessModes;
use pod_common::ConditionalSync;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::IssuanceError;

/// What the user approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// WebID of the requester.
    pub requester: String,
    /// Selected purposes, in request order.
    pub purposes: Vec<String>,
    /// Modes switched on, per resource.
    pub access: BTreeMap<Url, AccessModes>,
}

impl Approval {
    /// Every mode switched on, on any resource.
    pub fn modes(&self) -> AccessModes {
        self.access
            .values()
            .fold(AccessModes::none(), |modes, resource| modes.union(resource))
    }
}

/// A refusal. Only the requester is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    /// WebID of the requester.
    pub requester: String,
}

/// A credential issued for an approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedGrant {
    /// Credential identifier, propagated verbatim to the redirect.
    pub id: String,
    /// The credential as issued.
    pub credential: serde_json::Value,
}

/// A credential issued for a denial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenialReceipt {
    /// Credential identifier, propagated verbatim to the redirect.
    pub id: String,
    /// The credential as issued.
    pub credential: serde_json::Value,
}

/// Issues consent credentials. Both calls are fire-once: callers never
/// retry on their own.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ConsentIssuer: ConditionalSync {
    /// Issue a grant for an approval.
    async fn approve(&self, approval: &Approval) -> Result<SignedGrant, IssuanceError>;

    /// Record a denial.
    async fn deny(&self, denial: &Denial) -> Result<DenialReceipt, IssuanceError>;
}
