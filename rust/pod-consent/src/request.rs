use pod_access::{AccessMode, AccessModes};
use serde::{Deserialize, Serialize};
use url::Url;

/// A third party's request for access, as received. Never changed by the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    /// Display name of the requester.
    pub agent_name: String,
    /// Homepage of the requester.
    pub agent_url: Url,
    /// WebID the grant will be issued to.
    pub agent_web_id: String,
    /// Purposes offered, in display order.
    pub purposes: Vec<Purpose>,
    /// Where to send the user once the request is answered.
    pub redirect_url: String,
}

/// A justification attached to a set of requested modes over some resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purpose {
    /// Purpose identifier, usually an IRI.
    pub id: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Modes requested under this purpose.
    pub requested_access_modes: AccessModes,
    /// Resources the modes are requested on. A container covers its members.
    pub resources: Vec<Url>,
}

impl Purpose {
    /// Whether the purpose covers `resource`.
    pub fn covers(&self, resource: &Url) -> bool {
        self.resources.iter().any(|requested| {
            requested == resource
                || (pod_common::is_container(requested)
                    && resource.as_str().starts_with(requested.as_str()))
        })
    }
}

impl ConsentRequest {
    /// The purpose with identifier `id`.
    pub fn purpose(&self, id: &str) -> Option<&Purpose> {
        self.purposes.iter().find(|purpose| purpose.id == id)
    }

    /// Whether any purpose asks for `mode` on `resource`.
    pub fn requests(&self, resource: &Url, mode: AccessMode) -> bool {
        self.purposes.iter().any(|purpose| {
            purpose.requested_access_modes.contains(mode) && purpose.covers(resource)
        })
    }
}
