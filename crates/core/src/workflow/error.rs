//! Workflow error types for entity lifecycle management.
//!
//! Every refusal the engine produces is a `WorkflowError`. Each variant
//! belongs to one [`RejectionKind`]; everything except `RemoteFailure` is
//! decided before any backend call is made.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use leasedesk_shared::AppError;

use crate::workflow::role::UserRole;
use crate::workflow::types::{
    ApprovalStatus, EntityKey, EntityKind, LifecycleStatus, WorkflowAction,
};

/// Coarse classification of a refused transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Entity is in a protected state.
    Locked,
    /// Approval decision attempted outside a pending approval.
    InvalidState,
    /// Action not defined for the current lifecycle state.
    InvalidTransition,
    /// A required justification was empty.
    MissingRequiredField,
    /// Actor lacks the required role or authority.
    Unauthorized,
    /// Another transition is in flight for the entity.
    Busy,
    /// The backend call failed.
    RemoteFailure,
    /// No snapshot is loaded for the entity.
    NotFound,
}

impl RejectionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::InvalidState => "invalid_state",
            Self::InvalidTransition => "invalid_transition",
            Self::MissingRequiredField => "missing_required_field",
            Self::Unauthorized => "unauthorized",
            Self::Busy => "busy",
            Self::RemoteFailure => "remote_failure",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The entity is financially locked.
    #[error("Cannot {action} a {status} record")]
    Locked {
        /// The current lifecycle status.
        status: LifecycleStatus,
        /// The refused action.
        action: WorkflowAction,
    },

    /// Approve or reject attempted without a pending approval.
    #[error("Cannot {action}: approval status is {}", .approval.map_or("none", |a| a.as_str()))]
    InvalidState {
        /// The refused action.
        action: WorkflowAction,
        /// The current approval status.
        approval: Option<ApprovalStatus>,
    },

    /// The action is not defined for the current state.
    #[error("Cannot {action} a {kind} in status {from}")]
    InvalidTransition {
        /// The entity kind.
        kind: EntityKind,
        /// The current lifecycle status.
        from: LifecycleStatus,
        /// The refused action.
        action: WorkflowAction,
    },

    /// A required justification was empty.
    #[error("A {field} is required to {action}")]
    MissingRequiredField {
        /// The refused action.
        action: WorkflowAction,
        /// The missing field.
        field: &'static str,
    },

    /// User's role does not meet the required role.
    #[error("User role {user_role} does not meet required role {required_role}")]
    InsufficientRole {
        /// The user's role.
        user_role: UserRole,
        /// The required role for the operation.
        required_role: UserRole,
    },

    /// Entity amount exceeds the user's approval limit.
    #[error("Amount {amount} exceeds user approval limit {limit}")]
    ExceedsApprovalLimit {
        /// The entity amount.
        amount: Decimal,
        /// The user's approval limit.
        limit: Decimal,
    },

    /// A transition is already in flight for the entity.
    #[error("A workflow action is already in progress for {0}")]
    Busy(EntityKey),

    /// The backend refused or failed the call.
    #[error("{message}")]
    RemoteFailure {
        /// The action that was sent.
        action: WorkflowAction,
        /// Backend message, verbatim when one was returned.
        message: String,
    },

    /// No snapshot is loaded for the entity.
    #[error("Entity {0} not found")]
    EntityNotFound(EntityKey),

    /// The snapshot version cannot be incremented.
    #[error("Entity {0} cannot advance past its current version")]
    VersionExhausted(EntityKey),
}

impl WorkflowError {
    /// Returns the taxonomy entry for this error.
    #[must_use]
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::Locked { .. } => RejectionKind::Locked,
            Self::InvalidState { .. } | Self::VersionExhausted(_) => RejectionKind::InvalidState,
            Self::InvalidTransition { .. } => RejectionKind::InvalidTransition,
            Self::MissingRequiredField { .. } => RejectionKind::MissingRequiredField,
            Self::InsufficientRole { .. } | Self::ExceedsApprovalLimit { .. } => {
                RejectionKind::Unauthorized
            }
            Self::Busy(_) => RejectionKind::Busy,
            Self::RemoteFailure { .. } => RejectionKind::RemoteFailure,
            Self::EntityNotFound(_) => RejectionKind::NotFound,
        }
    }

    /// Returns true if the error was decided without calling the backend.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.kind() != RejectionKind::RemoteFailure
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            RejectionKind::MissingRequiredField => 400,
            RejectionKind::Unauthorized => 403,
            RejectionKind::NotFound => 404,
            RejectionKind::Busy => 409,
            RejectionKind::Locked
            | RejectionKind::InvalidState
            | RejectionKind::InvalidTransition => 422,
            RejectionKind::RemoteFailure => 502,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Locked { .. } => "ENTITY_LOCKED",
            Self::InvalidState { .. } => "INVALID_APPROVAL_STATE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::ExceedsApprovalLimit { .. } => "EXCEEDS_APPROVAL_LIMIT",
            Self::Busy(_) => "ACTION_IN_PROGRESS",
            Self::RemoteFailure { .. } => "REMOTE_FAILURE",
            Self::EntityNotFound(_) => "ENTITY_NOT_FOUND",
            Self::VersionExhausted(_) => "VERSION_EXHAUSTED",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err.kind() {
            RejectionKind::MissingRequiredField => Self::Validation(message),
            RejectionKind::Unauthorized => Self::Forbidden(message),
            RejectionKind::NotFound => Self::NotFound(message),
            RejectionKind::Busy => Self::Conflict(message),
            RejectionKind::Locked
            | RejectionKind::InvalidState
            | RejectionKind::InvalidTransition => Self::BusinessRule(message),
            RejectionKind::RemoteFailure => Self::ExternalService(message),
        }
    }
}
