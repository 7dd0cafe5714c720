use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use url::Url;

use crate::AccessModes;

/// Revisions of the ACP protocol the engine understands, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcpRevision {
    /// First published revision.
    V1,
    /// Second revision.
    V2,
    /// Third revision.
    V3,
    /// Current revision.
    V4,
}

impl AcpRevision {
    /// The revision the engine writes.
    pub const LATEST: AcpRevision = AcpRevision::V4;
}

impl Display for AcpRevision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AcpRevision::V1 => f.write_str("v1"),
            AcpRevision::V2 => f.write_str("v2"),
            AcpRevision::V3 => f.write_str("v3"),
            AcpRevision::V4 => f.write_str("v4"),
        }
    }
}

/// A link from a resource to its Access Control Resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcrLink {
    /// Where the ACR lives.
    pub url: Url,
    /// ACP revisions the server advertised for it.
    pub revisions: BTreeSet<AcpRevision>,
}

impl AcrLink {
    /// The newest advertised revision.
    pub fn negotiated_revision(&self) -> Option<AcpRevision> {
        self.revisions.iter().next_back().copied()
    }

    /// Whether the server offers the latest revision.
    pub fn is_current(&self) -> bool {
        self.revisions.contains(&AcpRevision::LATEST)
    }
}

/// Reference to a Pod resource together with the access-control metadata
/// discovered when it was fetched.
///
/// The engine never mutates a handle; changes go through a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    iri: Url,
    acl: Option<Url>,
    acr: Option<AcrLink>,
    #[serde(default)]
    user_access: AccessModes,
}

impl ResourceHandle {
    /// A handle with no linked access control.
    pub fn new(iri: Url) -> Self {
        Self {
            iri,
            acl: None,
            acr: None,
            user_access: AccessModes::none(),
        }
    }

    /// Attach a WAC ACL link.
    pub fn with_acl(mut self, acl: Url) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Attach an ACR link with the revisions the server advertised.
    pub fn with_acr<I>(mut self, acr: Url, revisions: I) -> Self
    where
        I: IntoIterator<Item = AcpRevision>,
    {
        self.acr = Some(AcrLink {
            url: acr,
            revisions: revisions.into_iter().collect(),
        });
        self
    }

    /// Record the modes the current actor holds on the resource.
    pub fn with_user_access(mut self, modes: AccessModes) -> Self {
        self.user_access = modes;
        self
    }

    /// The resource IRI.
    pub fn iri(&self) -> &Url {
        &self.iri
    }

    /// The linked WAC ACL, if any.
    pub fn acl(&self) -> Option<&Url> {
        self.acl.as_ref()
    }

    /// The linked ACR, if any.
    pub fn acr(&self) -> Option<&AcrLink> {
        self.acr.as_ref()
    }

    /// Modes the current actor holds on the resource.
    pub fn user_access(&self) -> &AccessModes {
        &self.user_access
    }

    /// Whether a WAC ACL is discoverable.
    pub fn has_accessible_acl(&self) -> bool {
        self.acl.is_some()
    }

    /// Whether an ACR is linked, regardless of revision.
    pub fn has_linked_acr(&self) -> bool {
        self.acr.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_negotiates_the_newest_revision() {
        let handle = ResourceHandle::new(Url::parse("https://pod.example/a").unwrap()).with_acr(
            Url::parse("https://pod.example/a?ext=acr").unwrap(),
            [AcpRevision::V1, AcpRevision::V4],
        );
        let acr = handle.acr().unwrap();

        assert_eq!(acr.negotiated_revision(), Some(AcpRevision::V4));
        assert!(acr.is_current());
    }

    #[test]
    fn it_reports_legacy_only_links_as_not_current() {
        let handle = ResourceHandle::new(Url::parse("https://pod.example/a").unwrap()).with_acr(
            Url::parse("https://pod.example/a?ext=acr").unwrap(),
            [AcpRevision::V1],
        );

        assert!(!handle.acr().unwrap().is_current());
        assert_eq!(
            handle.acr().unwrap().negotiated_revision(),
            Some(AcpRevision::V1)
        );
    }
}
