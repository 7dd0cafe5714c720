//! In-memory form of a WAC access control list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

use crate::{AccessControlType, AccessModes, Agent, RawGrant};

/// A WAC access control list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclDocument {
    /// Authorization rules, in document order.
    pub rules: Vec<AclRule>,
}

/// One `acl:Authorization` rule.
///
/// A rule applies to its `access_to` resource, and through `default` to
/// everything contained by that container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclRule {
    /// Fragment identifying the rule within its document.
    pub id: String,
    /// Individual agents (`acl:agent`).
    #[serde(default)]
    pub agents: BTreeSet<String>,
    /// Agent classes (`acl:agentClass`).
    #[serde(default)]
    pub agent_classes: BTreeSet<String>,
    /// Resource the rule grants access to (`acl:accessTo`).
    #[serde(default)]
    pub access_to: Option<Url>,
    /// Container whose members inherit the rule (`acl:default`).
    #[serde(default)]
    pub default: Option<Url>,
    /// Granted modes.
    pub modes: AccessModes,
}

impl AclRule {
    /// A rule granting `modes` on `resource` to nobody yet.
    pub fn new(id: impl Into<String>, modes: AccessModes) -> Self {
        Self {
            id: id.into(),
            agents: BTreeSet::new(),
            agent_classes: BTreeSet::new(),
            access_to: None,
            default: None,
            modes,
        }
    }

    /// Grant on `resource`.
    pub fn access_to(mut self, resource: Url) -> Self {
        self.access_to = Some(resource);
        self
    }

    /// Grant on the members of `container`.
    pub fn default_for(mut self, container: Url) -> Self {
        self.default = Some(container);
        self
    }

    /// Add an agent, stored as a class when it is a pseudo-agent.
    pub fn agent(mut self, agent: &Agent) -> Self {
        let raw = agent.raw(AccessControlType::Wac).to_string();
        if agent.pseudo().is_some() {
            self.agent_classes.insert(raw);
        } else {
            self.agents.insert(raw);
        }
        self
    }

    fn names(&self, agent: &Agent) -> bool {
        let raw = agent.raw(AccessControlType::Wac);
        if agent.pseudo().is_some() {
            self.agent_classes.contains(raw)
        } else {
            self.agents.contains(raw)
        }
    }

    fn forget(&mut self, agent: &Agent) {
        let raw = agent.raw(AccessControlType::Wac);
        if agent.pseudo().is_some() {
            self.agent_classes.remove(raw);
        } else {
            self.agents.remove(raw);
        }
    }

    fn is_vacant(&self) -> bool {
        self.agents.is_empty() && self.agent_classes.is_empty()
    }

    fn grants(&self, origin: &Url, distance: usize) -> impl Iterator<Item = RawGrant> + '_ {
        let origin = origin.clone();
        self.agents
            .iter()
            .chain(self.agent_classes.iter())
            .map(move |agent| RawGrant {
                agent: agent.clone(),
                modes: self.modes.clone(),
                origin: origin.clone(),
                distance,
            })
    }
}

impl AclDocument {
    /// Grants the document makes on `resource` itself.
    pub fn resource_grants(&self, resource: &Url, origin: &Url) -> Vec<RawGrant> {
        self.rules
            .iter()
            .filter(|rule| rule.access_to.as_ref() == Some(resource))
            .flat_map(|rule| rule.grants(origin, 0))
            .collect()
    }

    /// Grants the document makes on the members of `container`.
    pub fn default_grants(&self, container: &Url, origin: &Url, distance: usize) -> Vec<RawGrant> {
        self.rules
            .iter()
            .filter(|rule| rule.default.as_ref() == Some(container))
            .flat_map(|rule| rule.grants(origin, distance))
            .collect()
    }

    /// Modes granted to `agent` on `resource` by this document.
    pub fn direct_modes(&self, resource: &Url, agent: &Agent) -> AccessModes {
        self.rules
            .iter()
            .filter(|rule| rule.access_to.as_ref() == Some(resource) && rule.names(agent))
            .fold(AccessModes::none(), |modes, rule| modes.union(&rule.modes))
    }

    /// A new ACL for `resource` seeded from the default rules `container`'s
    /// ACL hands down.
    pub fn from_fallback(fallback: &AclDocument, container: &Url, resource: &Url) -> AclDocument {
        let inherits_defaults = pod_common::is_container(resource);
        let rules = fallback
            .rules
            .iter()
            .filter(|rule| rule.default.as_ref() == Some(container))
            .map(|rule| AclRule {
                access_to: Some(resource.clone()),
                default: inherits_defaults.then(|| resource.clone()),
                ..rule.clone()
            })
            .collect();
        AclDocument { rules }
    }

    /// Replace whatever `agent` holds on `resource` with exactly `modes`.
    ///
    /// Default grants the agent holds through the same rules are kept in a
    /// rule of their own, so members of a container are unaffected.
    pub fn set_access(&mut self, resource: &Url, agent: &Agent, modes: &AccessModes) {
        let mut kept_defaults = Vec::new();
        for rule in self
            .rules
            .iter_mut()
            .filter(|rule| rule.access_to.as_ref() == Some(resource))
        {
            if !rule.names(agent) {
                continue;
            }
            rule.forget(agent);
            if let Some(container) = &rule.default {
                kept_defaults.push(
                    AclRule::new(String::new(), rule.modes.clone())
                        .default_for(container.clone())
                        .agent(agent),
                );
            }
        }
        self.rules.retain(|rule| !rule.is_vacant());

        for mut rule in kept_defaults {
            rule.id = self.next_rule_id();
            self.rules.push(rule);
        }

        if !modes.is_empty() {
            let rule = AclRule::new(self.next_rule_id(), modes.clone())
                .access_to(resource.clone())
                .agent(agent);
            self.rules.push(rule);
        }
    }

    fn next_rule_id(&self) -> String {
        (0..)
            .map(|index| format!("#rule-{index}"))
            .find(|id| self.rules.iter().all(|rule| &rule.id != id))
            .unwrap_or_default()
    }
}
