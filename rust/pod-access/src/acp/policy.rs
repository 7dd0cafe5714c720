use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

use crate::{AccessModes, RawGrant};

/// An Access Control Resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcrDocument {
    /// Policies applying to the resource itself (`acp:apply`).
    pub policies: BTreeSet<Url>,
    /// Policies applying to the members of a container (`acp:applyMembers`).
    pub member_policies: BTreeSet<Url>,
}

/// A policy allowing modes to a set of agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Where the policy lives, fragment included.
    pub url: Url,
    /// Allowed modes.
    pub allow: AccessModes,
    /// Matched agents, as ACP identifies them.
    #[serde(default)]
    pub agents: BTreeSet<String>,
}

impl Policy {
    pub(crate) fn grants(&self, origin: &Url, distance: usize) -> Vec<RawGrant> {
        self.agents
            .iter()
            .map(|agent| RawGrant {
                agent: agent.clone(),
                modes: self.allow.clone(),
                origin: origin.clone(),
                distance,
            })
            .collect()
    }
}

/// A resource holding policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyResource {
    /// Policies in the resource.
    pub policies: Vec<Policy>,
}

impl PolicyResource {
    /// The policy at `url`.
    pub fn get(&self, url: &Url) -> Option<&Policy> {
        self.policies.iter().find(|policy| &policy.url == url)
    }

    /// Modes the resource's policies allow `agent`.
    pub fn modes_for(&self, agent: &str) -> AccessModes {
        self.policies
            .iter()
            .filter(|policy| policy.agents.contains(agent))
            .fold(AccessModes::none(), |modes, policy| modes.union(&policy.allow))
    }

    /// Match `agent` to exactly one policy allowing `modes`, named `{base}#{modes}`.
    /// Policies left matching nobody are removed.
    pub fn set_access(&mut self, base: &Url, agent: &str, modes: &AccessModes) {
        for policy in self.policies.iter_mut() {
            policy.agents.remove(agent);
        }

        if !modes.is_empty() {
            let mut url = base.clone();
            url.set_fragment(Some(&modes.name()));
            match self.policies.iter_mut().find(|policy| policy.url == url) {
                Some(policy) => {
                    policy.agents.insert(agent.to_string());
                }
                None => self.policies.push(Policy {
                    url,
                    allow: modes.clone(),
                    agents: BTreeSet::from([agent.to_string()]),
                }),
            }
        }

        self.policies.retain(|policy| !policy.agents.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessMode;
    use pretty_assertions::assert_eq;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn it_groups_agents_by_mode_set() {
        let base = url("https://pod.example/policies/docs/file.ttl");
        let mut resource = PolicyResource::default();
        let read = AccessModes::from([AccessMode::Read]);

        resource.set_access(&base, "https://bob.example/#me", &read);
        resource.set_access(&base, "https://zed.example/#me", &read);

        assert_eq!(resource.policies.len(), 1);
        assert_eq!(
            resource.policies[0].url,
            url("https://pod.example/policies/docs/file.ttl#read")
        );
        assert_eq!(resource.policies[0].agents.len(), 2);
    }

    #[test]
    fn it_moves_an_agent_between_policies() {
        let base = url("https://pod.example/policies/file.ttl");
        let mut resource = PolicyResource::default();

        resource.set_access(
            &base,
            "https://bob.example/#me",
            &AccessModes::from([AccessMode::Read]),
        );
        resource.set_access(
            &base,
            "https://bob.example/#me",
            &AccessModes::from([AccessMode::Read, AccessMode::Write]),
        );

        assert_eq!(resource.policies.len(), 1);
        assert_eq!(
            resource.modes_for("https://bob.example/#me"),
            AccessModes::from([AccessMode::Read, AccessMode::Write])
        );
    }

    #[test]
    fn it_drops_policies_nobody_matches() {
        let base = url("https://pod.example/policies/file.ttl");
        let mut resource = PolicyResource::default();

        resource.set_access(
            &base,
            "https://bob.example/#me",
            &AccessModes::from([AccessMode::Append]),
        );
        resource.set_access(&base, "https://bob.example/#me", &AccessModes::none());

        assert!(resource.policies.is_empty());
    }
}
