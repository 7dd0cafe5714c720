//! The scheme-agnostic permission model.
//!
//! Strategies read their scheme's documents into [`RawGrant`]s and hand them
//! to [`normalize`], which produces the single listing every caller sees.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::{AccessControlType, AccessModes, Agent};

/// One grant as read from a scheme document, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGrant {
    /// Agent identifier exactly as the scheme stores it.
    pub agent: String,
    /// Granted modes.
    pub modes: AccessModes,
    /// The ACL or ACR the grant was read from.
    pub origin: Url,
    /// Containment distance from the resource: `0` for the resource's own
    /// document, `1` for its container, and so on.
    pub distance: usize,
}

/// An agent's effective access to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Who the access is granted to.
    pub agent: Agent,
    /// Granted modes.
    pub modes: AccessModes,
    /// Whether the grant comes from an ancestor container.
    pub inherited: bool,
    /// The ACL or ACR that grants the access.
    pub origin: Url,
}

impl Permission {
    /// Canonical identifier of the agent.
    pub fn web_id(&self) -> &str {
        self.agent.as_str()
    }
}

/// Collapse raw grants into one permission per agent.
///
/// The nearest grant wins; grants at the same distance are merged. A
/// permission is `inherited` only when no grant at distance `0` exists for
/// its agent. Pseudo-agents are mapped onto their canonical identifiers, and
/// the output is sorted with pseudo-agents first.
pub fn normalize<I>(scheme: AccessControlType, grants: I) -> Vec<Permission>
where
    I: IntoIterator<Item = RawGrant>,
{
    let mut nearest: BTreeMap<Agent, (usize, AccessModes, Url)> = BTreeMap::new();

    for grant in grants {
        if grant.modes.is_empty() {
            continue;
        }
        let agent = Agent::from_raw(scheme, &grant.agent);
        match nearest.get_mut(&agent) {
            Some((distance, modes, origin)) => {
                if grant.distance < *distance {
                    *distance = grant.distance;
                    *modes = grant.modes;
                    *origin = grant.origin;
                } else if grant.distance == *distance {
                    *modes = modes.union(&grant.modes);
                }
            }
            None => {
                nearest.insert(agent, (grant.distance, grant.modes, grant.origin));
            }
        }
    }

    nearest
        .into_iter()
        .map(|(agent, (distance, modes, origin))| Permission {
            agent,
            modes,
            inherited: distance > 0,
            origin,
        })
        .collect()
}
