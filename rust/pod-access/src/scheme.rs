use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The authorization scheme governing a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessControlType {
    /// Access Control Policies.
    Acp,
    /// Web Access Control.
    Wac,
}

impl Display for AccessControlType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessControlType::Acp => f.write_str("acp"),
            AccessControlType::Wac => f.write_str("wac"),
        }
    }
}

/// Whether the type is ACP.
pub fn is_acp(access_control_type: AccessControlType) -> bool {
    access_control_type == AccessControlType::Acp
}

/// Whether the type is WAC.
pub fn is_wac(access_control_type: AccessControlType) -> bool {
    access_control_type == AccessControlType::Wac
}

/// Settings for the scheme detector.
///
/// ```rust
/// use pod_access::{AccessControlType, DetectionSettings};
///
/// let settings: DetectionSettings =
///     serde_json::from_str(r#"{ "hint": "acp" }"#).unwrap();
/// assert_eq!(settings.hint, Some(AccessControlType::Acp));
/// assert!(!settings.prefer_acp_fallback);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Accept an ACR that only offers older ACP revisions. The resulting
    /// strategy is read-only.
    pub prefer_acp_fallback: bool,

    /// Scheme to try before the probe order. A hint that does not hold is
    /// skipped, not reported.
    pub hint: Option<AccessControlType>,
}
