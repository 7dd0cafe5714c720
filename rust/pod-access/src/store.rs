//! The boundary to the remote data store.
//!
//! A [`ResourceStore`] is the authenticated fetch credential strategies use
//! for every call. The engine only relies on the semantics documented here;
//! the wire format of ACLs, ACRs and policies belongs to the implementation.

use async_trait::async_trait;
use pod_common::ConditionalSync;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::ResourceHandle;
use crate::acp::{AcrDocument, PolicyResource};
use crate::wac::AclDocument;

/// Errors reported by a [`ResourceStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(Url),

    /// The actor may not access the resource.
    #[error("Access to {0} was refused")]
    Forbidden(Url),

    /// Any other failure of the underlying transport or backend.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Scheme-specific read and write calls against the data store.
///
/// `get_*` calls return `Ok(None)` when the document does not exist yet;
/// `put_*` calls create the document if absent and replace it otherwise.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ResourceStore: ConditionalSync {
    /// Discover the access-control links of a resource.
    async fn head(&self, iri: &Url) -> Result<ResourceHandle, StoreError>;

    /// Read a WAC ACL.
    async fn get_acl(&self, acl: &Url) -> Result<Option<AclDocument>, StoreError>;

    /// Write a WAC ACL.
    async fn put_acl(&self, acl: &Url, document: &AclDocument) -> Result<(), StoreError>;

    /// Read an Access Control Resource.
    async fn get_acr(&self, acr: &Url) -> Result<Option<AcrDocument>, StoreError>;

    /// Write an Access Control Resource.
    async fn put_acr(&self, acr: &Url, document: &AcrDocument) -> Result<(), StoreError>;

    /// Read a resource holding ACP policies.
    async fn get_policies(&self, iri: &Url) -> Result<Option<PolicyResource>, StoreError>;

    /// Write a resource holding ACP policies.
    async fn put_policies(&self, iri: &Url, document: &PolicyResource)
    -> Result<(), StoreError>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<S> ResourceStore for Arc<S>
where
    S: ResourceStore + ?Sized,
{
    async fn head(&self, iri: &Url) -> Result<ResourceHandle, StoreError> {
        self.as_ref().head(iri).await
    }

    async fn get_acl(&self, acl: &Url) -> Result<Option<AclDocument>, StoreError> {
        self.as_ref().get_acl(acl).await
    }

    async fn put_acl(&self, acl: &Url, document: &AclDocument) -> Result<(), StoreError> {
        self.as_ref().put_acl(acl, document).await
    }

    async fn get_acr(&self, acr: &Url) -> Result<Option<AcrDocument>, StoreError> {
        self.as_ref().get_acr(acr).await
    }

    async fn put_acr(&self, acr: &Url, document: &AcrDocument) -> Result<(), StoreError> {
        self.as_ref().put_acr(acr, document).await
    }

    async fn get_policies(&self, iri: &Url) -> Result<Option<PolicyResource>, StoreError> {
        self.as_ref().get_policies(iri).await
    }

    async fn put_policies(
        &self,
        iri: &Url,
        document: &PolicyResource,
    ) -> Result<(), StoreError> {
        self.as_ref().put_policies(iri, document).await
    }
}

/// Handles of every ancestor container of `iri`, nearest first.
///
/// The walk stops at the first container the store does not know or refuses
/// to describe; other store failures are returned.
pub(crate) async fn visible_ancestors<S>(
    store: &S,
    iri: &Url,
) -> Result<Vec<ResourceHandle>, StoreError>
where
    S: ResourceStore + ?Sized,
{
    let mut handles = Vec::new();
    for container in pod_common::ancestors(iri) {
        match store.head(&container).await {
            Ok(handle) => handles.push(handle),
            Err(StoreError::NotFound(_)) | Err(StoreError::Forbidden(_)) => {
                tracing::debug!(%container, "container hierarchy not visible beyond this point");
                break;
            }
            Err(error) => return Err(error),
        }
    }
    Ok(handles)
}
