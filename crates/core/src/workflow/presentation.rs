//! Maps snapshots and errors to what a view shows.
//!
//! The menu is computed by running the validator, so a button is enabled
//! exactly when the engine would accept the action.

use serde::Serialize;

use crate::workflow::entity::WorkflowEntity;
use crate::workflow::error::{RejectionKind, WorkflowError};
use crate::workflow::role::{Actor, ApprovalPolicy};
use crate::workflow::types::{LifecycleStatus, WorkflowAction};
use crate::workflow::validator::{ActionPayload, TransitionValidator};

/// Placeholder reason used to evaluate reason-bearing actions; the view
/// collects the real one before submitting.
const PENDING_INPUT: &str = "pending input";

/// One entry of an entity's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionAvailability {
    /// The action.
    pub action: WorkflowAction,
    /// Whether the control is enabled.
    pub enabled: bool,
    /// Why it is disabled.
    pub blocked_by: Option<RejectionKind>,
    /// The view must ask for a reason before submitting.
    pub needs_reason: bool,
}

/// Enabled and disabled actions for one snapshot and actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionMenu {
    /// Entries in menu order.
    pub items: Vec<ActionAvailability>,
}

impl ActionMenu {
    /// Builds the menu for `entity` as seen by `actor`.
    ///
    /// `busy` disables every transition while one is in flight.
    #[must_use]
    pub fn build(
        entity: &WorkflowEntity,
        actor: &Actor,
        policy: &ApprovalPolicy,
        busy: bool,
    ) -> Self {
        let items = WorkflowAction::ALL
            .into_iter()
            .map(|action| {
                let payload = if action.requires_reason() {
                    ActionPayload::with_reason(PENDING_INPUT)
                } else {
                    ActionPayload::default()
                };
                let blocked_by = if busy && action.is_transition() {
                    Some(RejectionKind::Busy)
                } else {
                    TransitionValidator::validate(entity, action, actor, &payload, policy)
                        .err()
                        .map(|err| err.kind())
                };
                ActionAvailability {
                    action,
                    enabled: blocked_by.is_none(),
                    blocked_by,
                    needs_reason: action.requires_reason(),
                }
            })
            .collect();
        Self { items }
    }

    /// Returns the entry for `action`.
    #[must_use]
    pub fn get(&self, action: WorkflowAction) -> Option<&ActionAvailability> {
        self.items.iter().find(|item| item.action == action)
    }

    /// Returns true if `action` is enabled.
    #[must_use]
    pub fn is_enabled(&self, action: WorkflowAction) -> bool {
        self.get(action).is_some_and(|item| item.enabled)
    }

    /// Enabled actions, in menu order.
    #[must_use]
    pub fn enabled(&self) -> Vec<WorkflowAction> {
        self.items
            .iter()
            .filter(|item| item.enabled)
            .map(|item| item.action)
            .collect()
    }
}

/// Color family of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    /// Grey.
    Neutral,
    /// Blue.
    Info,
    /// Green.
    Success,
    /// Amber.
    Warning,
    /// Red.
    Danger,
}

/// Label and tone for a lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    /// Display label.
    pub label: &'static str,
    /// Color family.
    pub tone: BadgeTone,
}

impl StatusBadge {
    /// Badge for `status`.
    #[must_use]
    pub fn for_status(status: LifecycleStatus) -> Self {
        let (label, tone) = match status {
            LifecycleStatus::Draft => ("Draft", BadgeTone::Neutral),
            LifecycleStatus::Pending => ("Pending", BadgeTone::Warning),
            LifecycleStatus::Approved => ("Approved", BadgeTone::Info),
            LifecycleStatus::Rejected => ("Rejected", BadgeTone::Danger),
            LifecycleStatus::Posted => ("Posted", BadgeTone::Success),
            LifecycleStatus::Paid => ("Paid", BadgeTone::Success),
            LifecycleStatus::Reversed => ("Reversed", BadgeTone::Danger),
            LifecycleStatus::Cancelled => ("Cancelled", BadgeTone::Neutral),
            LifecycleStatus::Completed => ("Completed", BadgeTone::Success),
        };
        Self { label, tone }
    }
}

/// User-facing notification text for a refused or failed action.
///
/// Backend messages are passed through verbatim.
#[must_use]
pub fn notification_message(err: &WorkflowError) -> String {
    match err {
        WorkflowError::RemoteFailure { message, .. } => message.clone(),
        WorkflowError::Locked { status, .. } => {
            format!("This record is {status} and can no longer be changed.")
        }
        WorkflowError::InvalidState { .. } => {
            "This record is not awaiting approval.".to_string()
        }
        WorkflowError::InvalidTransition { action, from, .. } => {
            format!("You cannot {action} a record that is {from}.")
        }
        WorkflowError::MissingRequiredField { field, .. } => {
            format!("Please enter a {field}.")
        }
        WorkflowError::InsufficientRole { .. } => {
            "You do not have permission to perform this action.".to_string()
        }
        WorkflowError::ExceedsApprovalLimit { limit, .. } => {
            format!("This amount exceeds your approval limit of {limit}.")
        }
        WorkflowError::Busy(_) => {
            "Another action on this record is still in progress.".to_string()
        }
        WorkflowError::EntityNotFound(_) => "This record could not be found.".to_string(),
        WorkflowError::VersionExhausted(_) => {
            "This record can no longer be updated; reload it and try again.".to_string()
        }
    }
}
