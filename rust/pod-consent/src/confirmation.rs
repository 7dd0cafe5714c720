//! The confirmation gate in front of every submission.
//!
//! Four cases, checked in order:
//!
//! 1. The user denied: confirm the denial.
//! 2. The user approved with no purpose selected: confirm.
//! 3. The user approved with a purpose but no access switched on: confirm.
//! 4. Otherwise submit the approval without asking.

use serde::Serialize;

use crate::Selection;

/// Title shown before an explicit denial.
pub const DENY_ACCESS_DIALOG_TITLE: &str = "Deny all access?";

/// Title shown when approving without any purpose.
pub const NO_PURPOSE_TITLE: &str = "No purpose selected";

/// Title shown when approving without any access.
pub const NO_ACCESS_DIALOG_TITLE: &str = "No access selected";

/// Which way the user is trying to leave the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The approve button.
    Approve,
    /// The deny-all button.
    Deny,
}

/// Why a confirmation is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmationReason {
    /// The user asked to deny everything.
    DenyAll,
    /// No purpose is selected.
    NoPurpose,
    /// No access is switched on.
    NoAccess,
}

/// A confirmation the user must accept or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Why it is shown.
    pub reason: ConfirmationReason,
    /// Dialog title.
    pub title: &'static str,
    /// Dialog body.
    pub content: String,
}

impl Confirmation {
    fn new(reason: ConfirmationReason, agent_name: &str) -> Self {
        match reason {
            ConfirmationReason::DenyAll => Self {
                reason,
                title: DENY_ACCESS_DIALOG_TITLE,
                content: nothing_shared(agent_name),
            },
            ConfirmationReason::NoPurpose => Self {
                reason,
                title: NO_PURPOSE_TITLE,
                content: format!(
                    "At least one purpose needs to be selected to approve access for {agent_name}"
                ),
            },
            ConfirmationReason::NoAccess => Self {
                reason,
                title: NO_ACCESS_DIALOG_TITLE,
                content: nothing_shared(agent_name),
            },
        }
    }
}

fn nothing_shared(agent_name: &str) -> String {
    format!("{agent_name} will not have access to anything in your Pod.")
}

/// The confirmation to show, or `None` when the approval can go straight
/// through.
pub fn gate(intent: Intent, selection: &Selection, agent_name: &str) -> Option<Confirmation> {
    let reason = match intent {
        Intent::Deny => ConfirmationReason::DenyAll,
        Intent::Approve if !selection.has_purpose() => ConfirmationReason::NoPurpose,
        Intent::Approve if !selection.has_access() => ConfirmationReason::NoAccess,
        Intent::Approve => return None,
    };
    Some(Confirmation::new(reason, agent_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pod_access::AccessMode;
    use pretty_assertions::assert_eq;
    use url::Url;

    fn resource() -> Url {
        Url::parse("https://pod.example/alice/private/data/data-2").unwrap()
    }

    #[test]
    fn it_confirms_denial_regardless_of_toggles() {
        let mut selection = Selection::default();
        selection.toggle_purpose("purpose");
        selection.toggle_access(&resource(), AccessMode::Read);

        let confirmation = gate(Intent::Deny, &selection, "Mock App").unwrap();

        assert_eq!(confirmation.title, DENY_ACCESS_DIALOG_TITLE);
        assert_eq!(
            confirmation.content,
            "Mock App will not have access to anything in your Pod."
        );
    }

    #[test]
    fn it_checks_purposes_before_access() {
        let confirmation = gate(Intent::Approve, &Selection::default(), "Mock App").unwrap();

        assert_eq!(confirmation.reason, ConfirmationReason::NoPurpose);
        assert_eq!(confirmation.title, NO_PURPOSE_TITLE);
    }

    #[test]
    fn it_confirms_approval_without_access() {
        let mut selection = Selection::default();
        selection.toggle_purpose("purpose");

        let confirmation = gate(Intent::Approve, &selection, "Mock App").unwrap();

        assert_eq!(confirmation.title, NO_ACCESS_DIALOG_TITLE);
        assert_eq!(
            confirmation.content,
            "Mock App will not have access to anything in your Pod."
        );
    }

    #[test]
    fn it_lets_a_complete_approval_through() {
        let mut selection = Selection::default();
        selection.toggle_purpose("purpose");
        selection.toggle_access(&resource(), AccessMode::Append);

        assert_eq!(gate(Intent::Approve, &selection, "Mock App"), None);
    }
}
