use pod_access::{AccessMode, AccessModes};
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// What the user has switched on so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    purposes: BTreeSet<String>,
    access: BTreeMap<Url, AccessModes>,
}

impl Selection {
    /// Flip a purpose and return whether it is now selected.
    pub fn toggle_purpose(&mut self, id: &str) -> bool {
        if self.purposes.remove(id) {
            false
        } else {
            self.purposes.insert(id.to_string());
            true
        }
    }

    /// Flip one mode on one resource and return whether it is now on.
    pub fn toggle_access(&mut self, resource: &Url, mode: AccessMode) -> bool {
        let modes = self.access.entry(resource.clone()).or_default();
        let enabled = modes.toggle(mode);
        if modes.is_empty() {
            self.access.remove(resource);
        }
        enabled
    }

    /// Whether the purpose is selected.
    pub fn is_purpose_selected(&self, id: &str) -> bool {
        self.purposes.contains(id)
    }

    /// Selected purpose identifiers.
    pub fn purposes(&self) -> impl Iterator<Item = &str> {
        self.purposes.iter().map(String::as_str)
    }

    /// Modes switched on for `resource`.
    pub fn access_for(&self, resource: &Url) -> AccessModes {
        self.access.get(resource).cloned().unwrap_or_default()
    }

    /// Every resource with at least one mode switched on.
    pub fn access(&self) -> &BTreeMap<Url, AccessModes> {
        &self.access
    }

    /// Whether any purpose is selected.
    pub fn has_purpose(&self) -> bool {
        !self.purposes.is_empty()
    }

    /// Whether any mode is switched on anywhere.
    pub fn has_access(&self) -> bool {
        !self.access.is_empty()
    }
}
