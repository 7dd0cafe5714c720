use thiserror::Error;
use url::Url;

use crate::{AcpRevision, StoreError};

/// Message carried by [`AccessControlError::SchemeNotFound`].
pub const NO_ACCESS_POLICY_ERROR: &str = "No access policy found";

/// Errors raised while resolving or operating on a resource's access control.
#[derive(Debug, Error)]
pub enum AccessControlError {
    /// Neither ACP nor WAC governs the resource. Fatal for that resource: no
    /// scheme is ever assumed.
    #[error("No access policy found for {resource}")]
    SchemeNotFound {
        /// The resource that was probed.
        resource: Url,
    },

    /// The permission is inherited and can only be changed at the resource
    /// that defines it.
    #[error("Access for {agent} is inherited from {origin} and can only be revoked there")]
    InheritedPermissionRevoke {
        /// Canonical identifier of the agent.
        agent: String,
        /// The ACL or ACR that defines the grant.
        origin: Url,
    },

    /// The agent's access comes from an ACP policy kept outside the engine's
    /// own policy resource. Nothing was written.
    #[error("Access for {agent} is granted by {policy}, which is not managed here")]
    UnmanagedPolicy {
        /// Canonical identifier of the agent.
        agent: String,
        /// The policy that matches the agent.
        policy: Url,
    },

    /// The ACP resource speaks an older revision than the engine writes.
    /// Reading still works.
    #[error("{resource} uses ACP revision {revision}; changing access requires {required}")]
    ProtocolRevisionMismatch {
        /// The resource whose ACR is out of date.
        resource: Url,
        /// The revision negotiated with the resource.
        revision: AcpRevision,
        /// The revision required for writes.
        required: AcpRevision,
    },

    /// The WAC ACL does not exist and the actor cannot create it.
    #[error("Cannot create an access control list for {resource} without control access")]
    NoControlAccess {
        /// The resource lacking an ACL.
        resource: Url,
    },

    /// An IRI could not be derived.
    #[error("Invalid IRI: {0}")]
    Iri(#[from] url::ParseError),

    /// The resource store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
