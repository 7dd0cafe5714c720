//! Agents that permissions are granted to.
//!
//! Two well-known pseudo-agents exist besides individual WebIDs: "anyone"
//! and "anyone signed in". WAC encodes them as agent classes, ACP as special
//! agent matchers. Both encodings map onto the canonical identifiers below,
//! which are what listings, display code and callers use.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

use crate::AccessControlType;

/// Canonical identifier of the public pseudo-agent.
pub const PUBLIC_AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";

/// Canonical identifier of the authenticated pseudo-agent.
pub const AUTHENTICATED_AGENT: &str = "http://www.w3.org/ns/auth/acl#AuthenticatedAgent";

/// ACP encoding of the public pseudo-agent.
pub const ACP_PUBLIC_AGENT: &str = "http://www.w3.org/ns/solid/acp#PublicAgent";

/// ACP encoding of the authenticated pseudo-agent.
pub const ACP_AUTHENTICATED_AGENT: &str = "http://www.w3.org/ns/solid/acp#AuthenticatedAgent";

/// Raw scheme identifiers of the pseudo-agents.
const PSEUDO_AGENTS: [(AccessControlType, &str, PseudoAgent); 4] = [
    (AccessControlType::Wac, PUBLIC_AGENT, PseudoAgent::Public),
    (
        AccessControlType::Wac,
        AUTHENTICATED_AGENT,
        PseudoAgent::Authenticated,
    ),
    (AccessControlType::Acp, ACP_PUBLIC_AGENT, PseudoAgent::Public),
    (
        AccessControlType::Acp,
        ACP_AUTHENTICATED_AGENT,
        PseudoAgent::Authenticated,
    ),
];

/// A well-known non-individual grant target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PseudoAgent {
    /// Anyone, signed in or not.
    Public,
    /// Anyone signed in.
    Authenticated,
}

impl PseudoAgent {
    /// The canonical identifier.
    pub fn sentinel(&self) -> &'static str {
        match self {
            PseudoAgent::Public => PUBLIC_AGENT,
            PseudoAgent::Authenticated => AUTHENTICATED_AGENT,
        }
    }

    /// Display name.
    pub fn label(&self) -> &'static str {
        match self {
            PseudoAgent::Public => "Anyone",
            PseudoAgent::Authenticated => "Anyone signed in",
        }
    }

    /// Recognize a raw identifier produced by `scheme`.
    pub fn from_raw(scheme: AccessControlType, raw: &str) -> Option<PseudoAgent> {
        PSEUDO_AGENTS
            .iter()
            .find(|(owner, identifier, _)| *owner == scheme && *identifier == raw)
            .map(|(_, _, agent)| *agent)
    }

    /// The identifier `scheme` uses for this pseudo-agent.
    pub fn raw(&self, scheme: AccessControlType) -> &'static str {
        PSEUDO_AGENTS
            .iter()
            .find(|(owner, _, agent)| *owner == scheme && agent == self)
            .map(|(_, identifier, _)| *identifier)
            .unwrap_or_else(|| self.sentinel())
    }
}

/// A grant target: a pseudo-agent or an individual WebID.
///
/// Ordering puts pseudo-agents first (public, then authenticated), then
/// WebIDs lexically, which is the display order of listings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Agent {
    /// A pseudo-agent.
    Pseudo(PseudoAgent),
    /// An individual agent identified by its WebID.
    WebId(String),
}

impl Agent {
    /// Map a raw identifier produced by `scheme` onto an agent.
    pub fn from_raw(scheme: AccessControlType, raw: &str) -> Agent {
        match PseudoAgent::from_raw(scheme, raw) {
            Some(pseudo) => Agent::Pseudo(pseudo),
            None => Agent::WebId(raw.to_string()),
        }
    }

    /// The canonical identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Agent::Pseudo(pseudo) => pseudo.sentinel(),
            Agent::WebId(web_id) => web_id,
        }
    }

    /// The identifier `scheme` stores for this agent.
    pub fn raw(&self, scheme: AccessControlType) -> &str {
        match self {
            Agent::Pseudo(pseudo) => pseudo.raw(scheme),
            Agent::WebId(web_id) => web_id,
        }
    }

    /// The pseudo-agent, if this is one.
    pub fn pseudo(&self) -> Option<PseudoAgent> {
        match self {
            Agent::Pseudo(pseudo) => Some(*pseudo),
            Agent::WebId(_) => None,
        }
    }

    /// Fixed display name for pseudo-agents.
    pub fn label(&self) -> Option<&'static str> {
        self.pseudo().map(|pseudo| pseudo.label())
    }
}

impl From<PseudoAgent> for Agent {
    fn from(pseudo: PseudoAgent) -> Self {
        Agent::Pseudo(pseudo)
    }
}

/// Accepts canonical identifiers and either scheme's pseudo-agent encoding.
impl From<&str> for Agent {
    fn from(value: &str) -> Self {
        PSEUDO_AGENTS
            .iter()
            .find(|(_, identifier, _)| *identifier == value)
            .map(|(_, _, pseudo)| Agent::Pseudo(*pseudo))
            .unwrap_or_else(|| Agent::WebId(value.to_string()))
    }
}

impl From<String> for Agent {
    fn from(value: String) -> Self {
        Agent::from(value.as_str())
    }
}

impl Display for Agent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Agent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Agent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Agent::from(String::deserialize(deserializer)?))
    }
}
