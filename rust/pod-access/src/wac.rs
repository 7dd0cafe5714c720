//! Web Access Control.
//!
//! A WAC resource links an ACL listing rules that grant modes to agents and
//! agent classes. A resource without its own ACL is governed by the default
//! rules of the nearest ancestor container that has one; the resource's own
//! ACL is only created on the first change, seeded from those defaults.

mod acl;
pub use acl::*;

use async_trait::async_trait;
use url::Url;

use crate::store::visible_ancestors;
use crate::{
    AccessControl, AccessControlError, AccessControlType, AccessMode, AccessModes, Agent,
    Permission, RawGrant, ResourceHandle, ResourceStore, normalize,
};

/// Access control over a WAC resource.
#[derive(Debug)]
pub struct WacStrategy<S> {
    resource: ResourceHandle,
    acl: Url,
    store: S,
}

/// The nearest ancestor ACL, and how far up it was found.
struct Fallback {
    container: Url,
    acl: Url,
    document: AclDocument,
    distance: usize,
}

impl<S> WacStrategy<S> {
    /// The resource being managed.
    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    /// The resource's own ACL, which may not exist yet.
    pub fn acl(&self) -> &Url {
        &self.acl
    }
}

impl<S> WacStrategy<S>
where
    S: ResourceStore,
{
    /// Bind to `resource`. Fails when the resource links no ACL.
    pub fn init(resource: &ResourceHandle, store: S) -> Result<Self, AccessControlError> {
        let acl = resource
            .acl()
            .cloned()
            .ok_or_else(|| AccessControlError::SchemeNotFound {
                resource: resource.iri().clone(),
            })?;

        Ok(Self {
            resource: resource.clone(),
            acl,
            store,
        })
    }

    async fn fallback(&self) -> Result<Option<Fallback>, AccessControlError> {
        let ancestors = visible_ancestors(&self.store, self.resource.iri()).await?;
        for (index, container) in ancestors.iter().enumerate() {
            let Some(acl) = container.acl() else {
                continue;
            };
            if let Some(document) = self.store.get_acl(acl).await? {
                return Ok(Some(Fallback {
                    container: container.iri().clone(),
                    acl: acl.clone(),
                    document,
                    distance: index + 1,
                }));
            }
        }
        Ok(None)
    }

    async fn raw_grants(&self) -> Result<Vec<RawGrant>, AccessControlError> {
        let mut grants = match self.store.get_acl(&self.acl).await? {
            Some(document) => document.resource_grants(self.resource.iri(), &self.acl),
            None => Vec::new(),
        };

        if let Some(fallback) = self.fallback().await? {
            grants.extend(fallback.document.default_grants(
                &fallback.container,
                &fallback.acl,
                fallback.distance,
            ));
        }

        Ok(grants)
    }

    /// The resource's ACL as it should be written, creating it from the
    /// inherited defaults when it does not exist yet.
    async fn writable_acl(&self) -> Result<(AclDocument, bool), AccessControlError> {
        if let Some(document) = self.store.get_acl(&self.acl).await? {
            return Ok((document, true));
        }

        if !self.resource.user_access().contains(AccessMode::Control) {
            return Err(AccessControlError::NoControlAccess {
                resource: self.resource.iri().clone(),
            });
        }

        let document = match self.fallback().await? {
            Some(fallback) => AclDocument::from_fallback(
                &fallback.document,
                &fallback.container,
                self.resource.iri(),
            ),
            None => AclDocument::default(),
        };
        tracing::debug!(acl = %self.acl, "creating access control list from inherited defaults");
        Ok((document, false))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<S> AccessControl for WacStrategy<S>
where
    S: ResourceStore,
{
    async fn list_permissions(&self) -> Result<Vec<Permission>, AccessControlError> {
        Ok(normalize(AccessControlType::Wac, self.raw_grants().await?))
    }

    async fn grant_access(
        &mut self,
        agent: &Agent,
        modes: AccessModes,
    ) -> Result<Permission, AccessControlError> {
        let (mut document, exists) = self.writable_acl().await?;
        let permission = Permission {
            agent: agent.clone(),
            modes: modes.clone(),
            inherited: false,
            origin: self.acl.clone(),
        };

        if exists && document.direct_modes(self.resource.iri(), agent) == modes {
            tracing::debug!(%agent, "access already granted; nothing to write");
            return Ok(permission);
        }

        document.set_access(self.resource.iri(), agent, &modes);
        self.store.put_acl(&self.acl, &document).await?;
        tracing::info!(resource = %self.resource.iri(), %agent, %modes, "granted access");

        Ok(permission)
    }

    async fn revoke_access(&mut self, agent: &Agent) -> Result<(), AccessControlError> {
        let current = self
            .list_permissions()
            .await?
            .into_iter()
            .find(|permission| &permission.agent == agent);

        match current {
            None => {
                tracing::debug!(%agent, "no access to revoke");
                Ok(())
            }
            Some(permission) if permission.inherited => {
                Err(AccessControlError::InheritedPermissionRevoke {
                    agent: agent.to_string(),
                    origin: permission.origin,
                })
            }
            Some(_) => {
                let mut document = self.store.get_acl(&self.acl).await?.unwrap_or_default();
                document.set_access(self.resource.iri(), agent, &AccessModes::none());
                self.store.put_acl(&self.acl, &document).await?;
                tracing::info!(resource = %self.resource.iri(), %agent, "revoked access");
                Ok(())
            }
        }
    }

    fn supports_inheritance(&self) -> bool {
        true
    }
}
