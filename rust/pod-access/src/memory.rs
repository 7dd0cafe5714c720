use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

use crate::acp::{AcrDocument, PolicyResource};
use crate::wac::AclDocument;
use crate::{ResourceHandle, ResourceStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    handles: HashMap<Url, ResourceHandle>,
    forbidden: HashSet<Url>,
    acls: HashMap<Url, AclDocument>,
    acrs: HashMap<Url, AcrDocument>,
    policies: HashMap<Url, PolicyResource>,
    writes: usize,
}

/// A [`ResourceStore`] kept entirely in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Make `handle` discoverable.
    pub async fn insert_resource(&self, handle: ResourceHandle) {
        let mut state = self.state.write().await;
        state.handles.insert(handle.iri().clone(), handle);
    }

    /// Refuse to describe `iri`.
    pub async fn forbid(&self, iri: Url) {
        self.state.write().await.forbidden.insert(iri);
    }

    /// Seed an ACL without counting it as a write.
    pub async fn insert_acl(&self, acl: Url, document: AclDocument) {
        self.state.write().await.acls.insert(acl, document);
    }

    /// Seed an ACR without counting it as a write.
    pub async fn insert_acr(&self, acr: Url, document: AcrDocument) {
        self.state.write().await.acrs.insert(acr, document);
    }

    /// Seed a policy resource without counting it as a write.
    pub async fn insert_policies(&self, iri: Url, document: PolicyResource) {
        self.state.write().await.policies.insert(iri, document);
    }

    /// Number of `put_*` calls served so far.
    pub async fn writes(&self) -> usize {
        self.state.read().await.writes
    }

    /// The stored ACL at `acl`.
    pub async fn acl(&self, acl: &Url) -> Option<AclDocument> {
        self.state.read().await.acls.get(acl).cloned()
    }

    /// The stored ACR at `acr`.
    pub async fn acr(&self, acr: &Url) -> Option<AcrDocument> {
        self.state.read().await.acrs.get(acr).cloned()
    }

    /// The stored policy resource at `iri`.
    pub async fn policies(&self, iri: &Url) -> Option<PolicyResource> {
        self.state.read().await.policies.get(iri).cloned()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ResourceStore for MemoryStore {
    async fn head(&self, iri: &Url) -> Result<ResourceHandle, StoreError> {
        let state = self.state.read().await;
        if state.forbidden.contains(iri) {
            return Err(StoreError::Forbidden(iri.clone()));
        }
        state
            .handles
            .get(iri)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(iri.clone()))
    }

    async fn get_acl(&self, acl: &Url) -> Result<Option<AclDocument>, StoreError> {
        Ok(self.state.read().await.acls.get(acl).cloned())
    }

    async fn put_acl(&self, acl: &Url, document: &AclDocument) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.writes += 1;
        state.acls.insert(acl.clone(), document.clone());
        Ok(())
    }

    async fn get_acr(&self, acr: &Url) -> Result<Option<AcrDocument>, StoreError> {
        Ok(self.state.read().await.acrs.get(acr).cloned())
    }

    async fn put_acr(&self, acr: &Url, document: &AcrDocument) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.writes += 1;
        state.acrs.insert(acr.clone(), document.clone());
        Ok(())
    }

    async fn get_policies(&self, iri: &Url) -> Result<Option<PolicyResource>, StoreError> {
        Ok(self.state.read().await.policies.get(iri).cloned())
    }

    async fn put_policies(
        &self,
        iri: &Url,
        document: &PolicyResource,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.writes += 1;
        state.policies.insert(iri.clone(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::visible_ancestors;
    use testresult::TestResult;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[tokio::test]
    async fn it_counts_writes_but_not_seeds() -> TestResult {
        let store = MemoryStore::default();
        let acl = url("https://pod.example/.acl");

        store.insert_acl(acl.clone(), AclDocument::default()).await;
        assert_eq!(store.writes().await, 0);

        store.put_acl(&acl, &AclDocument::default()).await?;
        assert_eq!(store.writes().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn it_stops_the_ancestor_walk_at_hidden_containers() -> TestResult {
        let store = MemoryStore::default();
        store
            .insert_resource(ResourceHandle::new(url("https://pod.example/")))
            .await;
        store
            .insert_resource(ResourceHandle::new(url("https://pod.example/a/b/")))
            .await;
        store.forbid(url("https://pod.example/a/")).await;

        let ancestors = visible_ancestors(&store, &url("https://pod.example/a/b/c")).await?;

        assert_eq!(
            ancestors.iter().map(|handle| handle.iri().as_str()).collect::<Vec<_>>(),
            vec!["https://pod.example/a/b/"]
        );
        Ok(())
    }
}
