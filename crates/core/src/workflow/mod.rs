//! Workflow entity lifecycle engine.
//!
//! This module implements the status vocabulary, the transition validator,
//! the action executor with its per-entity busy guard, and the versioned
//! entity store that views subscribe to.
//!
//! # Modules
//!
//! - `types` - Entity kinds, lifecycle and approval statuses, actions
//! - `vocabulary` - Per-kind transition tables
//! - `role` - User roles and approval authority
//! - `error` - Workflow-specific error types
//! - `entity` - Entity snapshots and audit records
//! - `validator` - Pure transition validation
//! - `remote` - Backend contract
//! - `store` - Versioned snapshot store with subscriptions
//! - `executor` - Runs validated transitions against the backend
//! - `presentation` - Action menus, badges and notification text

pub mod entity;
pub mod error;
pub mod executor;
pub mod presentation;
pub mod remote;
pub mod role;
pub mod store;
pub mod types;
pub mod validator;
pub mod vocabulary;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod validator_props;

pub use entity::{AuditRecord, WorkflowEntity};
pub use error::{RejectionKind, WorkflowError};
pub use executor::{DiscardReason, TransitionOutcome, TransitionRequest, WorkflowExecutor};
pub use presentation::{
    ActionAvailability, ActionMenu, BadgeTone, StatusBadge, notification_message,
};
pub use remote::{RemoteError, RemotePatch, RemoteResponse, WorkflowRemote};
pub use role::{Actor, ApprovalPolicy, UserRole};
pub use store::{EntityStore, ReplaceOutcome, SnapshotReceiver};
pub use types::{
    ApprovalStatus, EntityKey, EntityKind, LifecycleStatus, UnknownStatus, WorkflowAction,
};
pub use validator::{ActionPayload, Permit, TransitionValidator};
pub use vocabulary::{Resolution, TransitionTable};
