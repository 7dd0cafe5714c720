//! Access Control Policies.
//!
//! An ACP resource links an Access Control Resource (ACR). The ACR references
//! policies that apply to the resource and, for containers, member policies
//! that apply to everything below it.
//!
//! The engine keeps the policies it writes in one policy resource per
//! managed resource, inside the policies container, at the path of the
//! resource with `.ttl` appended. Each distinct set of modes gets one policy
//! in that resource, at `#<modes>`. Policies the ACR references from
//! elsewhere are read and listed but never changed. When one of them matches
//! an agent, changing that agent's access fails with
//! [`AccessControlError::UnmanagedPolicy`] unless the result would still be
//! exactly what was asked for.

mod policy;
pub use policy::*;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::collections::HashMap;
use url::Url;

use crate::store::visible_ancestors;
use crate::{
    AccessControl, AccessControlError, AccessControlType, AccessModes, AcpRevision, Agent,
    Permission, RawGrant, ResourceHandle, ResourceStore, StoreError, normalize,
};

/// The policy resource holding the engine's policies for `resource`.
///
/// `policies_container` must end in `/`.
pub fn policy_resource_url(policies_container: &Url, resource: &Url) -> Result<Url, url::ParseError> {
    let relative = resource.path().trim_start_matches('/');
    let relative = if relative.is_empty() { "root" } else { relative };
    policies_container.join(&format!("./{relative}.ttl"))
}

fn document_of(policy: &Url) -> Url {
    let mut document = policy.clone();
    document.set_fragment(None);
    document
}

/// Access control over an ACP resource.
#[derive(Debug)]
pub struct AcpStrategy<S> {
    resource: ResourceHandle,
    policies_container: Url,
    acr: Url,
    revision: AcpRevision,
    store: S,
}

impl<S> AcpStrategy<S> {
    /// The resource being managed.
    pub fn resource(&self) -> &ResourceHandle {
        &self.resource
    }

    /// The linked Access Control Resource.
    pub fn acr(&self) -> &Url {
        &self.acr
    }

    /// The container the engine's policy resources live in.
    pub fn policies_container(&self) -> &Url {
        &self.policies_container
    }

    /// The ACP revision negotiated with the resource.
    pub fn revision(&self) -> AcpRevision {
        self.revision
    }

    /// Whether the resource speaks the revision the engine writes.
    pub fn uses_latest_protocol_revision(&self) -> bool {
        self.revision == AcpRevision::LATEST
    }

    fn ensure_writable(&self) -> Result<(), AccessControlError> {
        if self.uses_latest_protocol_revision() {
            Ok(())
        } else {
            Err(AccessControlError::ProtocolRevisionMismatch {
                resource: self.resource.iri().clone(),
                revision: self.revision,
                required: AcpRevision::LATEST,
            })
        }
    }
}

/// Policy resources fetched during one listing.
#[derive(Default)]
struct PolicyCache {
    documents: HashMap<Url, Option<PolicyResource>>,
}

impl PolicyCache {
    async fn policy<S>(&mut self, store: &S, url: &Url) -> Result<Option<Policy>, StoreError>
    where
        S: ResourceStore + ?Sized,
    {
        let document = document_of(url);
        if !self.documents.contains_key(&document) {
            let fetched = store.get_policies(&document).await?;
            self.documents.insert(document.clone(), fetched);
        }

        let policy = self
            .documents
            .get(&document)
            .and_then(|resource| resource.as_ref())
            .and_then(|resource| resource.get(url))
            .cloned();
        if policy.is_none() {
            tracing::debug!(policy = %url, "referenced policy does not exist");
        }
        Ok(policy)
    }
}

impl<S> AcpStrategy<S>
where
    S: ResourceStore,
{
    /// Bind to `resource`. Fails when the resource links no ACR.
    pub fn init(
        resource: &ResourceHandle,
        policies_container: &Url,
        store: S,
    ) -> Result<Self, AccessControlError> {
        let not_found = || AccessControlError::SchemeNotFound {
            resource: resource.iri().clone(),
        };
        let link = resource.acr().ok_or_else(not_found)?;
        let revision = link.negotiated_revision().ok_or_else(not_found)?;

        Ok(Self {
            resource: resource.clone(),
            policies_container: policies_container.clone(),
            acr: link.url.clone(),
            revision,
            store,
        })
    }

    /// Where the engine keeps this resource's policies.
    pub fn policy_resource(&self) -> Result<Url, AccessControlError> {
        Ok(policy_resource_url(
            &self.policies_container,
            self.resource.iri(),
        )?)
    }

    async fn raw_grants(&self) -> Result<Vec<RawGrant>, AccessControlError> {
        let mut cache = PolicyCache::default();
        let mut grants = Vec::new();

        if let Some(acr) = self.store.get_acr(&self.acr).await? {
            for url in &acr.policies {
                if let Some(policy) = cache.policy(&self.store, url).await? {
                    grants.extend(policy.grants(&self.acr, 0));
                }
            }
        }

        let ancestors = visible_ancestors(&self.store, self.resource.iri()).await?;
        let linked = ancestors
            .iter()
            .enumerate()
            .filter_map(|(index, container)| container.acr().map(|link| (index + 1, &link.url)));
        let documents = try_join_all(linked.map(|(distance, acr)| async move {
            self.store
                .get_acr(acr)
                .await
                .map(|document| (distance, acr, document))
        }))
        .await?;

        for (distance, acr, document) in documents {
            let Some(document) = document else {
                continue;
            };
            for url in &document.member_policies {
                if let Some(policy) = cache.policy(&self.store, url).await? {
                    grants.extend(policy.grants(acr, distance));
                }
            }
        }

        Ok(grants)
    }

    /// Policies applying to the resource itself that live outside the
    /// engine's policy resource and match `agent`.
    async fn unmanaged_policies(&self, agent: &Agent) -> Result<Vec<Policy>, AccessControlError> {
        let Some(acr) = self.store.get_acr(&self.acr).await? else {
            return Ok(Vec::new());
        };
        let base = self.policy_resource()?;
        let mut cache = PolicyCache::default();
        let mut matching = Vec::new();

        for url in acr.policies.iter().filter(|url| document_of(url) != base) {
            if let Some(policy) = cache.policy(&self.store, url).await? {
                if policy
                    .agents
                    .iter()
                    .any(|raw| &Agent::from_raw(AccessControlType::Acp, raw) == agent)
                {
                    matching.push(policy);
                }
            }
        }
        Ok(matching)
    }

    fn unmanaged(agent: &Agent, policy: &Policy) -> AccessControlError {
        AccessControlError::UnmanagedPolicy {
            agent: agent.to_string(),
            policy: policy.url.clone(),
        }
    }

    /// Point `agent` at exactly `modes` through the engine's own policies.
    /// Returns whether anything was written.
    async fn apply(&self, agent: &Agent, modes: &AccessModes) -> Result<bool, AccessControlError> {
        let base = self.policy_resource()?;
        let raw = agent.raw(AccessControlType::Acp);

        let current_policies = self.store.get_policies(&base).await?.unwrap_or_default();
        let current_acr = self.store.get_acr(&self.acr).await?.unwrap_or_default();

        let mut policies = current_policies.clone();
        policies.set_access(&base, raw, modes);

        let mut acr = current_acr.clone();
        acr.policies.retain(|url| document_of(url) != base);
        acr.policies
            .extend(policies.policies.iter().map(|policy| policy.url.clone()));

        if policies == current_policies && acr == current_acr {
            return Ok(false);
        }

        // Policies first, so the ACR never references a policy that is not
        // there yet.
        if policies != current_policies {
            self.store.put_policies(&base, &policies).await?;
        }
        if acr != current_acr {
            self.store.put_acr(&self.acr, &acr).await?;
        }
        Ok(true)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<S> AccessControl for AcpStrategy<S>
where
    S: ResourceStore,
{
    async fn list_permissions(&self) -> Result<Vec<Permission>, AccessControlError> {
        Ok(normalize(AccessControlType::Acp, self.raw_grants().await?))
    }

    async fn grant_access(
        &mut self,
        agent: &Agent,
        modes: AccessModes,
    ) -> Result<Permission, AccessControlError> {
        self.ensure_writable()?;

        // A policy outside our own resource allowing more than `modes` would
        // keep the extra modes in effect.
        if let Some(policy) = self
            .unmanaged_policies(agent)
            .await?
            .iter()
            .find(|policy| !policy.allow.is_subset(&modes))
        {
            return Err(Self::unmanaged(agent, policy));
        }

        if self.apply(agent, &modes).await? {
            tracing::info!(resource = %self.resource.iri(), %agent, %modes, "granted access");
        } else {
            tracing::debug!(%agent, "access already granted; nothing to write");
        }

        let effective = self
            .list_permissions()
            .await?
            .into_iter()
            .find(|permission| &permission.agent == agent);
        Ok(effective.unwrap_or_else(|| Permission {
            agent: agent.clone(),
            modes,
            inherited: false,
            origin: self.acr.clone(),
        }))
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
                self.ensure_writable()?;
                if let Some(policy) = self.unmanaged_policies(agent).await?.first() {
                    return Err(Self::unmanaged(agent, policy));
                }

                self.apply(agent, &AccessModes::none()).await?;
                tracing::info!(resource = %self.resource.iri(), %agent, "revoked access");
                Ok(())
            }
        }
    }

    fn supports_inheritance(&self) -> bool {
        true
    }

    fn read_only(&self) -> bool {
        !self.uses_latest_protocol_revision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn it_mirrors_the_resource_path() {
        let container = url("https://pod.example/alice/policies/");

        assert_eq!(
            policy_resource_url(&container, &url("https://pod.example/alice/docs/file")).unwrap(),
            url("https://pod.example/alice/policies/alice/docs/file.ttl")
        );
    }

    #[test]
    fn it_names_the_storage_root_policies() {
        let container = url("https://pod.example/policies/");

        assert_eq!(
            policy_resource_url(&container, &url("https://pod.example/")).unwrap(),
            url("https://pod.example/policies/root.ttl")
        );
    }
}
