//! The consent session state machine.
//!
//! ```text
//! Collecting --approve (complete)------------------> Submitting
//! Collecting --approve (incomplete) / deny---------> Confirming
//! Confirming --cancel------------------------------> Collecting
//! Confirming --confirm-----------------------------> Submitting
//! Submitting --submit (issuer answers)-------------> Resolved
//! Submitting --submit (issuer fails)---------------> Submitting
//! Resolved   --redirect----------------------------> Redirected
//! Redirected --redirect----------------------------> Redirected
//! ```
//!
//! Confirming an incomplete approval submits a denial: the user agreed to
//! share nothing.

use pod_access::{AccessMode, AccessModes};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use url::Url;

use crate::{
    Approval, Confirmation, ConsentError, ConsentIssuer, ConsentRequest, ConsentSettings, Denial,
    DenialReceipt, Intent, Selection, SignedGrant, compose_redirect, gate,
};

/// The terminal outcome of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    /// The user approved and a grant was issued.
    Approved {
        /// Purposes consented to.
        purposes: Vec<String>,
        /// Modes granted, per resource.
        access: BTreeMap<Url, AccessModes>,
        /// The issued grant.
        grant: SignedGrant,
    },
    /// The user refused and the denial was recorded.
    Denied {
        /// The issued receipt.
        receipt: DenialReceipt,
    },
}

impl AccessDecision {
    /// Identifier of the issued credential.
    pub fn credential_id(&self) -> &str {
        match self {
            AccessDecision::Approved { grant, .. } => &grant.id,
            AccessDecision::Denied { receipt } => &receipt.id,
        }
    }

    /// Whether access was granted.
    pub fn is_approved(&self) -> bool {
        matches!(self, AccessDecision::Approved { .. })
    }
}

/// The one call a session makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Issue a grant.
    Approve(Approval),
    /// Record a denial.
    Deny(Denial),
}

/// Where a session is.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentState {
    /// The user is choosing purposes and access.
    Collecting,
    /// A confirmation is waiting for the user.
    Confirming {
        /// What to show.
        confirmation: Confirmation,
        /// What confirming submits.
        pending: Submission,
    },
    /// Ready to make, or making, the issuance call.
    Submitting(Submission),
    /// The issuer answered.
    Resolved(AccessDecision),
    /// The caller has been handed the redirect.
    Redirected {
        /// The outcome.
        decision: AccessDecision,
        /// The completed redirect.
        location: String,
    },
}

/// [`ConsentState`] without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentPhase {
    /// See [`ConsentState::Collecting`].
    Collecting,
    /// See [`ConsentState::Confirming`].
    Confirming,
    /// See [`ConsentState::Submitting`].
    Submitting,
    /// See [`ConsentState::Resolved`].
    Resolved,
    /// See [`ConsentState::Redirected`].
    Redirected,
}

impl Display for ConsentPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConsentPhase::Collecting => "collecting",
            ConsentPhase::Confirming => "confirming",
            ConsentPhase::Submitting => "submitting",
            ConsentPhase::Resolved => "resolved",
            ConsentPhase::Redirected => "redirected",
        })
    }
}

impl ConsentState {
    /// The state's phase.
    pub fn phase(&self) -> ConsentPhase {
        match self {
            ConsentState::Collecting => ConsentPhase::Collecting,
            ConsentState::Confirming { .. } => ConsentPhase::Confirming,
            ConsentState::Submitting(_) => ConsentPhase::Submitting,
            ConsentState::Resolved(_) => ConsentPhase::Resolved,
            ConsentState::Redirected { .. } => ConsentPhase::Redirected,
        }
    }
}

/// Result of pressing approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// The user must confirm or cancel first.
    Confirm(Confirmation),
    /// The approval is ready to submit.
    Proceed,
}

/// One user's answer to one [`ConsentRequest`].
#[derive(Debug)]
pub struct ConsentSession {
    request: ConsentRequest,
    settings: ConsentSettings,
    selection: Selection,
    state: ConsentState,
    in_flight: bool,
}

impl ConsentSession {
    /// A session with default settings.
    pub fn new(request: ConsentRequest) -> Self {
        Self::with_settings(request, ConsentSettings::default())
    }

    /// A session with explicit settings.
    pub fn with_settings(request: ConsentRequest, settings: ConsentSettings) -> Self {
        Self {
            request,
            settings,
            selection: Selection::default(),
            state: ConsentState::Collecting,
            in_flight: false,
        }
    }

    /// The request being answered.
    pub fn request(&self) -> &ConsentRequest {
        &self.request
    }

    /// What the user has switched on.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current state.
    pub fn state(&self) -> &ConsentState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> ConsentPhase {
        self.state.phase()
    }

    /// The outcome, once the issuer has answered.
    pub fn decision(&self) -> Option<&AccessDecision> {
        match &self.state {
            ConsentState::Resolved(decision) | ConsentState::Redirected { decision, .. } => {
                Some(decision)
            }
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> ConsentError {
        ConsentError::InvalidTransition {
            phase: self.phase(),
            action,
        }
    }

    fn collecting(&self, action: &'static str) -> Result<(), ConsentError> {
        match self.state {
            ConsentState::Collecting => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn transition(&mut self, state: ConsentState) {
        tracing::debug!(from = %self.phase(), to = %state.phase(), "consent session transition");
        self.state = state;
    }

    /// Flip a purpose. Returns whether it is now selected.
    pub fn toggle_purpose(&mut self, id: &str) -> Result<bool, ConsentError> {
        self.collecting("change purposes")?;
        if self.request.purpose(id).is_none() {
            return Err(ConsentError::UnknownPurpose(id.to_string()));
        }
        Ok(self.selection.toggle_purpose(id))
    }

    /// Flip one mode on one resource. Returns whether it is now on.
    pub fn toggle_access(&mut self, resource: &Url, mode: AccessMode) -> Result<bool, ConsentError> {
        self.collecting("change access")?;
        if !self.request.requests(resource, mode) {
            return Err(ConsentError::UnrequestedAccess {
                resource: resource.clone(),
                mode,
            });
        }
        Ok(self.selection.toggle_access(resource, mode))
    }

    fn approval(&self) -> Approval {
        Approval {
            requester: self.request.agent_web_id.clone(),
            purposes: self
                .request
                .purposes
                .iter()
                .filter(|purpose| self.selection.is_purpose_selected(&purpose.id))
                .map(|purpose| purpose.id.clone())
                .collect(),
            access: self.selection.access().clone(),
        }
    }

    fn denial(&self) -> Denial {
        Denial {
            requester: self.request.agent_web_id.clone(),
        }
    }

    /// Press approve.
    ///
    /// An approval with at least one purpose and one mode goes straight to
    /// [`ConsentPhase::Submitting`]; anything less asks for confirmation.
    pub fn approve(&mut self) -> Result<Gate, ConsentError> {
        self.collecting("approve")?;
        match gate(Intent::Approve, &self.selection, &self.request.agent_name) {
            Some(confirmation) => {
                let pending = Submission::Deny(self.denial());
                self.transition(ConsentState::Confirming {
                    confirmation: confirmation.clone(),
                    pending,
                });
                Ok(Gate::Confirm(confirmation))
            }
            None => {
                let approval = self.approval();
                self.transition(ConsentState::Submitting(Submission::Approve(approval)));
                Ok(Gate::Proceed)
            }
        }
    }

    /// Press deny. Always asks for confirmation.
    pub fn deny(&mut self) -> Result<Confirmation, ConsentError> {
        self.collecting("deny")?;
        let confirmation = gate(Intent::Deny, &self.selection, &self.request.agent_name)
            .ok_or_else(|| self.invalid("deny"))?;
        let pending = Submission::Deny(self.denial());
        self.transition(ConsentState::Confirming {
            confirmation: confirmation.clone(),
            pending,
        });
        Ok(confirmation)
    }

    /// Accept the confirmation.
    pub fn confirm(&mut self) -> Result<(), ConsentError> {
        let pending = match &self.state {
            ConsentState::Confirming { pending, .. } => pending.clone(),
            _ => return Err(self.invalid("confirm")),
        };
        self.transition(ConsentState::Submitting(pending));
        Ok(())
    }

    /// Dismiss the confirmation and keep editing.
    pub fn cancel(&mut self) -> Result<(), ConsentError> {
        match self.state {
            ConsentState::Confirming { .. } => {
                self.transition(ConsentState::Collecting);
                Ok(())
            }
            _ => Err(self.invalid("cancel")),
        }
    }

    /// Make the issuance call.
    ///
    /// Exactly one call is made per invocation. On failure the session stays
    /// in [`ConsentPhase::Submitting`] and may be submitted again; nothing is
    /// retried automatically. A submission whose future was dropped before it
    /// finished leaves the session unusable.
    pub async fn submit<I>(&mut self, issuer: &I) -> Result<AccessDecision, ConsentError>
    where
        I: ConsentIssuer + ?Sized,
    {
        let submission = match &self.state {
            ConsentState::Submitting(submission) => submission.clone(),
            _ => return Err(self.invalid("submit")),
        };
        if self.in_flight {
            return Err(ConsentError::SubmissionAbandoned);
        }

        self.in_flight = true;
        let outcome = match &submission {
            Submission::Approve(approval) => {
                tracing::info!(requester = %approval.requester, "issuing consent grant");
                issuer
                    .approve(approval)
                    .await
                    .map(|grant| AccessDecision::Approved {
                        purposes: approval.purposes.clone(),
                        access: approval.access.clone(),
                        grant,
                    })
            }
            Submission::Deny(denial) => {
                tracing::info!(requester = %denial.requester, "recording consent denial");
                issuer
                    .deny(denial)
                    .await
                    .map(|receipt| AccessDecision::Denied { receipt })
            }
        };
        self.in_flight = false;

        match outcome {
            Ok(decision) => {
                self.transition(ConsentState::Resolved(decision.clone()));
                Ok(decision)
            }
            Err(error) => {
                tracing::warn!(%error, "consent issuance failed");
                Err(error.into())
            }
        }
    }

    /// The caller's redirect target with the credential identifier
    /// appended. Repeating it returns the same location.
    pub fn redirect(&mut self) -> Result<String, ConsentError> {
        match &self.state {
            ConsentState::Redirected { location, .. } => Ok(location.clone()),
            ConsentState::Resolved(decision) => {
                let location = compose_redirect(
                    &self.request.redirect_url,
                    &self.settings.redirect_parameter,
                    decision.credential_id(),
                )?;
                let decision = decision.clone();
                self.transition(ConsentState::Redirected {
                    decision,
                    location: location.clone(),
                });
                Ok(location)
            }
            _ => Err(self.invalid("redirect")),
        }
    }
}
