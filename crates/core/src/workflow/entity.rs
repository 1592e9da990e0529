//! Immutable snapshots of workflow entities.
//!
//! A snapshot is never modified after construction. A committed transition
//! produces a new snapshot with a higher version; consumers replace their
//! copy instead of patching it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leasedesk_shared::types::ActorId;

use crate::workflow::error::WorkflowError;
use crate::workflow::remote::RemotePatch;
use crate::workflow::types::{ApprovalStatus, EntityKey, LifecycleStatus, WorkflowAction};
use crate::workflow::validator::Permit;
use crate::workflow::vocabulary::Resolution;

/// One entry of an entity's append-only audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Who acted.
    pub actor_id: ActorId,
    /// What was done.
    pub action: WorkflowAction,
    /// When the transition committed.
    pub timestamp: DateTime<Utc>,
    /// Reason or comments supplied with the action.
    pub comment: Option<String>,
}

/// Point-in-time state of a payment voucher, lease revenue posting, or
/// contract termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntity {
    /// Kind and ID.
    pub key: EntityKey,
    /// Primary workflow state.
    pub lifecycle_status: LifecycleStatus,
    /// Approval state; `None` when not applicable or not yet submitted.
    pub approval_status: Option<ApprovalStatus>,
    /// Monetary amount used for approval limits.
    pub amount: Option<Decimal>,
    /// Monotonic snapshot version.
    pub version: u64,
    /// When this snapshot was produced.
    pub updated_at: DateTime<Utc>,
    /// Approver name returned by the backend.
    pub approved_by: Option<String>,
    /// Approval timestamp returned by the backend.
    pub approved_on: Option<DateTime<Utc>>,
    /// Rejecting user returned by the backend.
    pub rejected_by: Option<String>,
    /// Rejection timestamp returned by the backend.
    pub rejected_on: Option<DateTime<Utc>>,
    /// Posting or payment timestamp.
    pub posted_on: Option<DateTime<Utc>>,
    /// Reference of the reversing journal.
    pub reversal_reference: Option<String>,
    /// Append-only history of committed transitions.
    pub audit_trail: Vec<AuditRecord>,
}

impl WorkflowEntity {
    /// Creates a snapshot in `status` at version 1 with an empty trail.
    #[must_use]
    pub fn new(key: EntityKey, status: LifecycleStatus) -> Self {
        Self {
            key,
            lifecycle_status: status,
            approval_status: None,
            amount: None,
            version: 1,
            updated_at: Utc::now(),
            approved_by: None,
            approved_on: None,
            rejected_by: None,
            rejected_on: None,
            posted_on: None,
            reversal_reference: None,
            audit_trail: Vec::new(),
        }
    }

    /// Creates a new draft.
    #[must_use]
    pub fn draft(key: EntityKey) -> Self {
        Self::new(key, LifecycleStatus::Draft)
    }

    /// Sets the approval status.
    #[must_use]
    pub fn with_approval(mut self, approval: Option<ApprovalStatus>) -> Self {
        self.approval_status = approval;
        self
    }

    /// Sets the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Returns true once money has moved or the record reached a terminal
    /// state. Only `Reverse` and `View` may be attempted on a locked entity.
    #[must_use]
    pub fn financial_lock(&self) -> bool {
        self.lifecycle_status.is_settled() || self.lifecycle_status.is_terminal()
    }

    /// Builds the snapshot that follows a committed transition.
    ///
    /// The returned snapshot has `version + 1`, the permit's resolved states,
    /// the backend's patch fields, and exactly one more audit record.
    ///
    /// # Errors
    ///
    /// Returns `VersionExhausted` if the version is already `u64::MAX`.
    pub fn advance(
        &self,
        permit: &Permit,
        actor_id: ActorId,
        patch: &RemotePatch,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        let version = self
            .version
            .checked_add(1)
            .ok_or_else(|| WorkflowError::VersionExhausted(self.key.clone()))?;
        let mut next = self.clone();
        if let Resolution::Status(status) = permit.to {
            next.lifecycle_status = status;
        }
        next.approval_status = permit.approval_after;
        next.version = version;
        next.updated_at = now;

        match permit.action {
            WorkflowAction::Approve => {
                next.approved_by = patch.approved_by.clone().or(next.approved_by);
                next.approved_on = Some(patch.approved_on.unwrap_or(now));
            }
            WorkflowAction::Reject => {
                next.rejected_by = patch.rejected_by.clone().or(next.rejected_by);
                next.rejected_on = Some(patch.rejected_on.unwrap_or(now));
            }
            WorkflowAction::ResetApproval => {
                next.approved_by = None;
                next.approved_on = None;
                next.rejected_by = None;
                next.rejected_on = None;
            }
            WorkflowAction::Post => {
                next.posted_on = Some(patch.posted_on.unwrap_or(now));
            }
            WorkflowAction::Reverse => {
                next.reversal_reference = patch.reversal_reference.clone();
            }
            _ => {}
        }

        next.audit_trail.push(AuditRecord {
            actor_id,
            action: permit.action,
            timestamp: now,
            comment: permit.comment.clone(),
        });
        Ok(next)
    }
}
