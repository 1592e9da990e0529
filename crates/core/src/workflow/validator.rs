//! Pure transition validation.
//!
//! [`TransitionValidator::validate`] decides, without any I/O, whether an
//! actor may take an action on a snapshot. Checks run in this order and the
//! first failure wins:
//!
//! 1. `Reject`/`Reverse` need a non-blank reason
//! 2. a financially locked entity only accepts `Reverse` and `View`
//! 3. `Approve`/`Reject` need a pending approval
//! 4. `Approve`/`Reject`/`ResetApproval` need the approver role (and limit)
//! 5. the kind's transition table must list the action for the current state
//! 6. a state-changing action needs room to bump the snapshot version

use serde::{Deserialize, Serialize};

use crate::workflow::entity::WorkflowEntity;
use crate::workflow::error::WorkflowError;
use crate::workflow::role::{Actor, ApprovalPolicy};
use crate::workflow::types::{ApprovalStatus, EntityKey, LifecycleStatus, WorkflowAction};
use crate::workflow::vocabulary::{Resolution, TransitionTable};

/// Free-text input collected with an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    /// Justification for rejections and reversals.
    pub reason: Option<String>,
    /// Optional approver comments.
    pub comments: Option<String>,
}

impl ActionPayload {
    /// A payload carrying a reason.
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            comments: None,
        }
    }

    /// A payload carrying comments.
    #[must_use]
    pub fn with_comments(comments: impl Into<String>) -> Self {
        Self {
            reason: None,
            comments: Some(comments.into()),
        }
    }

    /// The reason, trimmed, if it is not blank.
    #[must_use]
    pub fn reason_text(&self) -> Option<&str> {
        non_blank(self.reason.as_deref())
    }

    /// The comments, trimmed, if they are not blank.
    #[must_use]
    pub fn comments_text(&self) -> Option<&str> {
        non_blank(self.comments.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// A validated transition, ready for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permit {
    /// The entity the permit is for.
    pub key: EntityKey,
    /// The permitted action.
    pub action: WorkflowAction,
    /// Lifecycle status the permit was granted from.
    pub from: LifecycleStatus,
    /// Where the action leads.
    pub to: Resolution,
    /// Approval status after commit.
    pub approval_after: Option<ApprovalStatus>,
    /// Text recorded in the audit trail and sent to the backend.
    pub comment: Option<String>,
    /// Snapshot version the permit was granted against.
    pub expected_version: u64,
}

/// Stateless validator over snapshots.
pub struct TransitionValidator;

impl TransitionValidator {
    /// Validate `action` on `entity` for `actor`.
    ///
    /// # Returns
    /// * `Ok(Permit)` carrying the resolved next state
    /// * `Err(WorkflowError)` whose [`kind`](WorkflowError::kind) is one of
    ///   `MissingRequiredField`, `Locked`, `InvalidState`, `Unauthorized`,
    ///   or `InvalidTransition`
    pub fn validate(
        entity: &WorkflowEntity,
        action: WorkflowAction,
        actor: &Actor,
        payload: &ActionPayload,
        policy: &ApprovalPolicy,
    ) -> Result<Permit, WorkflowError> {
        let kind = entity.key.kind;
        let status = entity.lifecycle_status;

        if action.requires_reason() && payload.reason_text().is_none() {
            return Err(WorkflowError::MissingRequiredField {
                action,
                field: "reason",
            });
        }

        if entity.financial_lock() && !matches!(action, WorkflowAction::Reverse | WorkflowAction::View)
        {
            return Err(WorkflowError::Locked { status, action });
        }

        if action.is_approval_decision() && entity.approval_status != Some(ApprovalStatus::Pending)
        {
            return Err(WorkflowError::InvalidState {
                action,
                approval: entity.approval_status,
            });
        }

        if action.is_privileged() {
            if action == WorkflowAction::Approve {
                policy.authorize_amount(actor, kind, entity.amount)?;
            } else {
                policy.authorize(actor, kind)?;
            }
        }

        let to = TransitionTable::next_state(kind, status, action)?;

        if action.is_transition() && to != Resolution::Removed && entity.version == u64::MAX {
            return Err(WorkflowError::VersionExhausted(entity.key.clone()));
        }

        let comment = if action.requires_reason() {
            payload.reason_text()
        } else {
            payload.comments_text()
        };

        Ok(Permit {
            key: entity.key.clone(),
            action,
            from: status,
            to,
            approval_after: TransitionTable::approval_after(kind, action, entity.approval_status),
            comment: comment.map(str::to_string),
            expected_version: entity.version,
        })
    }
}
