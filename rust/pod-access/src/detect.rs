//! Scheme detection.
//!
//! Detection only looks at the links a [`ResourceHandle`] carries, so it
//! never touches the network and both [`has_access`] and [`resolve`] give the
//! same answer for the same handle.

use url::Url;

use crate::{
    AccessControlError, AccessControlType, AcpStrategy, DetectionSettings, ResourceHandle,
    ResourceStore, Strategy, WacStrategy,
};

/// Whether either scheme governs `resource` in a way the engine can manage.
///
/// True exactly when [`resolve`] succeeds without `prefer_acp_fallback`, so an
/// ACR advertising only older ACP revisions does not count. Use
/// [`DetectionSettings::has_access`] to answer for other settings.
pub fn has_access(resource: &ResourceHandle) -> bool {
    accessible(resource, false)
}

fn accessible(resource: &ResourceHandle, prefer_acp_fallback: bool) -> bool {
    applies(resource, AccessControlType::Acp, prefer_acp_fallback)
        || applies(resource, AccessControlType::Wac, prefer_acp_fallback)
}

fn applies(resource: &ResourceHandle, scheme: AccessControlType, prefer_acp_fallback: bool) -> bool {
    match scheme {
        AccessControlType::Acp => resource.acr().is_some_and(|link| {
            link.is_current() || (prefer_acp_fallback && link.negotiated_revision().is_some())
        }),
        AccessControlType::Wac => resource.has_accessible_acl(),
    }
}

fn select<S>(
    scheme: AccessControlType,
    resource: &ResourceHandle,
    policies_container: &Url,
    store: S,
) -> Result<Strategy<S>, AccessControlError>
where
    S: ResourceStore,
{
    let strategy: Strategy<S> = match scheme {
        AccessControlType::Acp => AcpStrategy::init(resource, policies_container, store)?.into(),
        AccessControlType::Wac => WacStrategy::init(resource, store)?.into(),
    };

    if let Strategy::Acp(acp) = &strategy {
        if !acp.uses_latest_protocol_revision() {
            tracing::info!(
                revision = %acp.revision(),
                "resource speaks an older ACP revision; access can be listed but not changed"
            );
        }
    }
    tracing::debug!(%scheme, "selected access control strategy");
    Ok(strategy)
}

/// Pick the strategy governing `resource`.
///
/// A `hint` is tried first and skipped when it does not hold. Otherwise ACP
/// is probed before WAC. ACP is only selected when the ACR advertises the
/// latest revision, unless `prefer_acp_fallback` is set, in which case any
/// supported revision is accepted and the strategy comes back read-only.
#[tracing::instrument(skip_all, fields(resource = %resource.iri()))]
pub fn resolve<S>(
    resource: &ResourceHandle,
    policies_container: &Url,
    store: S,
    prefer_acp_fallback: bool,
    hint: Option<AccessControlType>,
) -> Result<Strategy<S>, AccessControlError>
where
    S: ResourceStore,
{
    if let Some(hint) = hint {
        if applies(resource, hint, prefer_acp_fallback) {
            return select(hint, resource, policies_container, store);
        }
        tracing::warn!(%hint, "hinted access control scheme does not apply to resource");
    }

    for scheme in [AccessControlType::Acp, AccessControlType::Wac] {
        if applies(resource, scheme, prefer_acp_fallback) {
            return select(scheme, resource, policies_container, store);
        }
    }

    Err(AccessControlError::SchemeNotFound {
        resource: resource.iri().clone(),
    })
}

impl DetectionSettings {
    /// [`has_access`] with these settings. True exactly when
    /// [`DetectionSettings::resolve`] succeeds.
    pub fn has_access(&self, resource: &ResourceHandle) -> bool {
        accessible(resource, self.prefer_acp_fallback)
    }

    /// [`resolve`] with these settings.
    pub fn resolve<S>(
        &self,
        resource: &ResourceHandle,
        policies_container: &Url,
        store: S,
    ) -> Result<Strategy<S>, AccessControlError>
    where
        S: ResourceStore,
    {
        resolve(
            resource,
            policies_container,
            store,
            self.prefer_acp_fallback,
            self.hint,
        )
    }
}
