//! An in-memory [`ConsentIssuer`] for tests.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    Approval, ConsentIssuer, Denial, DenialReceipt, IssuanceError, SignedGrant, Submission,
};

#[derive(Debug, Default)]
struct Record {
    calls: Vec<Submission>,
    failures: usize,
}

/// Answers every call with a fixed identifier and remembers what it was
/// asked. Can be told to fail its first few calls.
#[derive(Debug, Clone)]
pub struct RecordingIssuer {
    grant_id: String,
    denial_id: String,
    record: Arc<Mutex<Record>>,
}

impl RecordingIssuer {
    /// Answers approvals with `grant_id` and denials with `denial_id`.
    pub fn new(grant_id: impl Into<String>, denial_id: impl Into<String>) -> Self {
        Self {
            grant_id: grant_id.into(),
            denial_id: denial_id.into(),
            record: Arc::default(),
        }
    }

    /// Fail the next `failures` calls.
    pub fn failing(self, failures: usize) -> Self {
        if let Ok(mut record) = self.record.try_lock() {
            record.failures = failures;
        }
        self
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<Submission> {
        self.record.lock().await.calls.clone()
    }

    async fn record(&self, submission: Submission) -> Result<(), IssuanceError> {
        let mut record = self.record.lock().await;
        record.calls.push(submission);
        if record.failures > 0 {
            record.failures -= 1;
            return Err(IssuanceError::Request(
                "consent service unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ConsentIssuer for RecordingIssuer {
    async fn approve(&self, approval: &Approval) -> Result<SignedGrant, IssuanceError> {
        self.record(Submission::Approve(approval.clone())).await?;
        Ok(SignedGrant {
            id: self.grant_id.clone(),
            credential: json!({ "id": self.grant_id, "isProvidedTo": approval.requester }),
        })
    }

    async fn deny(&self, denial: &Denial) -> Result<DenialReceipt, IssuanceError> {
        self.record(Submission::Deny(denial.clone())).await?;
        Ok(DenialReceipt {
            id: self.denial_id.clone(),
            credential: json!({ "id": self.denial_id, "isProvidedTo": denial.requester }),
        })
    }
}

/// Never answers. Lets tests drop a submission mid-flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct PendingIssuer;

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ConsentIssuer for PendingIssuer {
    async fn approve(&self, _approval: &Approval) -> Result<SignedGrant, IssuanceError> {
        std::future::pending().await
    }

    async fn deny(&self, _denial: &Denial) -> Result<DenialReceipt, IssuanceError> {
        std::future::pending().await
    }
}
