use async_trait::async_trait;
use pod_common::ConditionalSync;

use crate::{
    AccessControlError, AccessControlType, AccessModes, AcpStrategy, Agent, Permission,
    ResourceHandle, ResourceStore, WacStrategy,
};

/// The uniform contract for reading and changing who may access a resource.
///
/// Implementations exist per scheme; callers receive one from [`crate::resolve`]
/// and never branch on the scheme themselves.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait AccessControl: ConditionalSync {
    /// Effective grants on the resource, at most one per agent, pseudo-agents
    /// first.
    async fn list_permissions(&self) -> Result<Vec<Permission>, AccessControlError>;

    /// Give `agent` exactly `modes` on the resource.
    ///
    /// Modes previously held directly are replaced, not merged. Granting the
    /// modes the agent already holds directly does not write anything.
    async fn grant_access(
        &mut self,
        agent: &Agent,
        modes: AccessModes,
    ) -> Result<Permission, AccessControlError>;

    /// Remove `agent`'s direct access to the resource.
    ///
    /// Fails with [`AccessControlError::InheritedPermissionRevoke`] when the
    /// agent's effective permission comes from an ancestor, and leaves every
    /// document untouched in that case.
    async fn revoke_access(&mut self, agent: &Agent) -> Result<(), AccessControlError>;

    /// Whether grants on containers can flow down to their members.
    fn supports_inheritance(&self) -> bool;

    /// Whether writes are known to fail. Reads keep working.
    fn read_only(&self) -> bool {
        false
    }
}

/// The strategy selected for a resource.
#[derive(Debug)]
pub enum Strategy<S> {
    /// The resource is governed by ACP.
    Acp(AcpStrategy<S>),
    /// The resource is governed by WAC.
    Wac(WacStrategy<S>),
}

impl<S> Strategy<S> {
    /// The scheme this strategy speaks.
    pub fn access_control_type(&self) -> AccessControlType {
        match self {
            Strategy::Acp(_) => AccessControlType::Acp,
            Strategy::Wac(_) => AccessControlType::Wac,
        }
    }

    /// The resource the strategy manages.
    pub fn resource(&self) -> &ResourceHandle {
        match self {
            Strategy::Acp(strategy) => strategy.resource(),
            Strategy::Wac(strategy) => strategy.resource(),
        }
    }
}

impl<S> From<AcpStrategy<S>> for Strategy<S> {
    fn from(strategy: AcpStrategy<S>) -> Self {
        Strategy::Acp(strategy)
    }
}

impl<S> From<WacStrategy<S>> for Strategy<S> {
    fn from(strategy: WacStrategy<S>) -> Self {
        Strategy::Wac(strategy)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<S> AccessControl for Strategy<S>
where
    S: ResourceStore,
{
    async fn list_permissions(&self) -> Result<Vec<Permission>, AccessControlError> {
        match self {
            Strategy::Acp(strategy) => strategy.list_permissions().await,
            Strategy::Wac(strategy) => strategy.list_permissions().await,
        }
    }

    async fn grant_access(
        &mut self,
        agent: &Agent,
        modes: AccessModes,
    ) -> Result<Permission, AccessControlError> {
        match self {
            Strategy::Acp(strategy) => strategy.grant_access(agent, modes).await,
            Strategy::Wac(strategy) => strategy.grant_access(agent, modes).await,
        }
    }

    async fn revoke_access(&mut self, agent: &Agent) -> Result<(), AccessControlError> {
        match self {
            Strategy::Acp(strategy) => strategy.revoke_access(agent).await,
            Strategy::Wac(strategy) => strategy.revoke_access(agent).await,
        }
    }

    fn supports_inheritance(&self) -> bool {
        match self {
            Strategy::Acp(strategy) => strategy.supports_inheritance(),
            Strategy::Wac(strategy) => strategy.supports_inheritance(),
        }
    }

    fn read_only(&self) -> bool {
        match self {
            Strategy::Acp(strategy) => strategy.read_only(),
            Strategy::Wac(strategy) => strategy.read_only(),
        }
    }
}
