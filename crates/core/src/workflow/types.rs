//! Workflow domain types for entity lifecycle management.
//!
//! This module defines the closed vocabularies the engine works with:
//! entity kinds, lifecycle states, approval states, and workflow actions.
//! Status strings coming from the backend are parsed into these enums once;
//! an unknown string is an error, never a silent mismatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use leasedesk_shared::types::EntityId;

/// A status or action string that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {vocabulary} value '{value}'")]
pub struct UnknownStatus {
    /// Which vocabulary was being parsed.
    pub vocabulary: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownStatus {
    fn new(vocabulary: &'static str, value: &str) -> Self {
        Self {
            vocabulary,
            value: value.to_string(),
        }
    }
}

/// The kinds of back-office records that share the workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Outgoing payment voucher.
    PaymentVoucher,
    /// Lease revenue posting transaction.
    LeaseRevenue,
    /// Lease contract termination.
    ContractTermination,
}

impl EntityKind {
    /// All entity kinds.
    pub const ALL: [Self; 3] = [
        Self::PaymentVoucher,
        Self::LeaseRevenue,
        Self::ContractTermination,
    ];

    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentVoucher => "payment_voucher",
            Self::LeaseRevenue => "lease_revenue",
            Self::ContractTermination => "contract_termination",
        }
    }

    /// Parses a kind from a string. Accepts `snake_case` and `kebab-case`.
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "payment_voucher" => Ok(Self::PaymentVoucher),
            "lease_revenue" => Ok(Self::LeaseRevenue),
            "contract_termination" | "termination" => Ok(Self::ContractTermination),
            _ => Err(UnknownStatus::new("entity kind", s)),
        }
    }

    /// Returns true if records of this kind go through an approval step.
    #[must_use]
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::PaymentVoucher | Self::ContractTermination)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Store and in-flight key: an entity ID is only unique within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    /// The entity kind.
    pub kind: EntityKind,
    /// The entity ID.
    pub id: EntityId,
}

impl EntityKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Primary workflow state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Being prepared; freely editable.
    Draft,
    /// Submitted and awaiting a decision or posting.
    Pending,
    /// Approved and awaiting payment or completion.
    Approved,
    /// Rejected by an approver.
    Rejected,
    /// Posted to the general ledger.
    Posted,
    /// Paid out.
    Paid,
    /// Reversed after posting or payment (immutable).
    Reversed,
    /// Cancelled before money moved (immutable).
    Cancelled,
    /// Workflow finished (immutable).
    Completed,
}

impl LifecycleStatus {
    /// All lifecycle states.
    pub const ALL: [Self; 9] = [
        Self::Draft,
        Self::Pending,
        Self::Approved,
        Self::Rejected,
        Self::Posted,
        Self::Paid,
        Self::Reversed,
        Self::Cancelled,
        Self::Completed,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Posted => "posted",
            Self::Paid => "paid",
            Self::Reversed => "reversed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "posted" => Ok(Self::Posted),
            "paid" => Ok(Self::Paid),
            "reversed" => Ok(Self::Reversed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(UnknownStatus::new("lifecycle status", s)),
        }
    }

    /// Returns true if no transition leaves this state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reversed | Self::Cancelled | Self::Completed)
    }

    /// Returns true if money has moved for an entity in this state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Posted | Self::Paid)
    }

    /// Returns true if the entity can be edited or deleted.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Secondary approval state, orthogonal to the lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Waiting for an approver.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses an approval status. `"none"` and the empty string mean absent.
    pub fn parse(s: &str) -> Result<Option<Self>, UnknownStatus> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(None),
            "pending" => Ok(Some(Self::Pending)),
            "approved" => Ok(Some(Self::Approved)),
            "rejected" => Ok(Some(Self::Rejected)),
            _ => Err(UnknownStatus::new("approval status", s)),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An action a user can request against a workflow entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    /// Submit a draft for processing.
    Submit,
    /// Approve a pending entity.
    Approve,
    /// Reject a pending entity (reason required).
    Reject,
    /// Send an approved or rejected entity back for approval.
    ResetApproval,
    /// Post to the ledger or mark as paid.
    Post,
    /// Reverse a settled entity (reason required).
    Reverse,
    /// Cancel before money moves.
    Cancel,
    /// Mark the workflow as finished.
    Complete,
    /// Delete a draft or pending entity.
    Delete,
    /// Edit entity fields.
    Edit,
    /// Read the entity.
    View,
}

impl WorkflowAction {
    /// All actions, in menu order.
    pub const ALL: [Self; 11] = [
        Self::View,
        Self::Edit,
        Self::Submit,
        Self::Approve,
        Self::Reject,
        Self::ResetApproval,
        Self::Post,
        Self::Complete,
        Self::Reverse,
        Self::Cancel,
        Self::Delete,
    ];

    /// Returns the string representation of the action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ResetApproval => "reset_approval",
            Self::Post => "post",
            Self::Reverse => "reverse",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Delete => "delete",
            Self::Edit => "edit",
            Self::View => "view",
        }
    }

    /// Parses an action. Accepts `snake_case` and `kebab-case`.
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "submit" => Ok(Self::Submit),
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            "reset_approval" => Ok(Self::ResetApproval),
            "post" => Ok(Self::Post),
            "reverse" => Ok(Self::Reverse),
            "cancel" => Ok(Self::Cancel),
            "complete" => Ok(Self::Complete),
            "delete" => Ok(Self::Delete),
            "edit" => Ok(Self::Edit),
            "view" => Ok(Self::View),
            _ => Err(UnknownStatus::new("workflow action", s)),
        }
    }

    /// Returns true for the approval decisions that act on a pending approval.
    #[must_use]
    pub fn is_approval_decision(&self) -> bool {
        matches!(self, Self::Approve | Self::Reject)
    }

    /// Returns true if the action needs the privileged approver role.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Approve | Self::Reject | Self::ResetApproval)
    }

    /// Returns true if the action needs a non-empty reason.
    #[must_use]
    pub fn requires_reason(&self) -> bool {
        matches!(self, Self::Reject | Self::Reverse)
    }

    /// Returns true if the action changes the entity through the backend.
    ///
    /// `Edit` and `View` are gated by the validator but are not transitions.
    #[must_use]
    pub fn is_transition(&self) -> bool {
        !matches!(self, Self::Edit | Self::View)
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
