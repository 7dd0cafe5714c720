use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// A single access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Read the resource.
    Read,
    /// Replace or delete the resource.
    Write,
    /// Add to the resource without removing anything.
    Append,
    /// Read and change the resource's access control.
    Control,
}

impl AccessMode {
    /// Every mode, in canonical order.
    pub const ALL: [AccessMode; 4] = [
        AccessMode::Read,
        AccessMode::Write,
        AccessMode::Append,
        AccessMode::Control,
    ];

    /// Lowercase name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Append => "append",
            AccessMode::Control => "control",
        }
    }

    /// The `acl:` vocabulary term for the mode.
    pub fn iri(&self) -> &'static str {
        match self {
            AccessMode::Read => "http://www.w3.org/ns/auth/acl#Read",
            AccessMode::Write => "http://www.w3.org/ns/auth/acl#Write",
            AccessMode::Append => "http://www.w3.org/ns/auth/acl#Append",
            AccessMode::Control => "http://www.w3.org/ns/auth/acl#Control",
        }
    }
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of access modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessModes(BTreeSet<AccessMode>);

impl AccessModes {
    /// The empty set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether `mode` is in the set.
    pub fn contains(&self, mode: AccessMode) -> bool {
        self.0.contains(&mode)
    }

    /// Add a mode.
    pub fn insert(&mut self, mode: AccessMode) -> bool {
        self.0.insert(mode)
    }

    /// Remove a mode.
    pub fn remove(&mut self, mode: AccessMode) -> bool {
        self.0.remove(&mode)
    }

    /// Flip a mode and return whether it is now present.
    pub fn toggle(&mut self, mode: AccessMode) -> bool {
        if self.0.remove(&mode) {
            false
        } else {
            self.0.insert(mode);
            true
        }
    }

    /// Whether no mode is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of modes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Modes in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = AccessMode> + '_ {
        self.0.iter().copied()
    }

    /// Modes present in either set.
    pub fn union(&self, other: &AccessModes) -> AccessModes {
        AccessModes(self.0.union(&other.0).copied().collect())
    }

    /// Whether every mode of `self` is also in `other`.
    pub fn is_subset(&self, other: &AccessModes) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Stable name of the combination, e.g. `read-append`, or `none`.
    pub fn name(&self) -> String {
        if self.is_empty() {
            return "none".into();
        }
        self.iter()
            .map(|mode| mode.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl Display for AccessModes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.name())
    }
}

impl FromIterator<AccessMode> for AccessModes {
    fn from_iter<T: IntoIterator<Item = AccessMode>>(iter: T) -> Self {
        AccessModes(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[AccessMode; N]> for AccessModes {
    fn from(modes: [AccessMode; N]) -> Self {
        modes.into_iter().collect()
    }
}

impl IntoIterator for AccessModes {
    type Item = AccessMode;
    type IntoIter = std::collections::btree_set::IntoIter<AccessMode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_names_mode_sets_canonically() {
        let modes = AccessModes::from([AccessMode::Append, AccessMode::Read]);
        assert_eq!(modes.name(), "read-append");
        assert_eq!(AccessModes::none().name(), "none");
    }

    #[test]
    fn it_toggles_modes() {
        let mut modes = AccessModes::none();
        assert!(modes.toggle(AccessMode::Write));
        assert!(modes.contains(AccessMode::Write));
        assert!(!modes.toggle(AccessMode::Write));
        assert!(modes.is_empty());
    }

    #[test]
    fn it_serializes_as_lowercase_list() {
        let modes = AccessModes::from([AccessMode::Read, AccessMode::Control]);
        assert_eq!(
            serde_json::to_string(&modes).unwrap(),
            r#"["read","control"]"#
        );
    }
}
