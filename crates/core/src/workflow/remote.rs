//! Contract of the backend that performs workflow mutations.
//!
//! The engine never talks to the backend except through [`WorkflowRemote`],
//! and only the executor holds one. Implementations own their transport and
//! timeouts; a timeout is reported as a [`RemoteError`] like any other failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

use crate::workflow::types::{EntityKey, LifecycleStatus};

/// Fields the backend may return alongside a successful mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePatch {
    /// Name of the approver.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// When the approval was recorded.
    #[serde(default)]
    pub approved_on: Option<DateTime<Utc>>,
    /// Name of the rejecting user.
    #[serde(default)]
    pub rejected_by: Option<String>,
    /// When the rejection was recorded.
    #[serde(default)]
    pub rejected_on: Option<DateTime<Utc>>,
    /// When the entity was posted or paid.
    #[serde(default)]
    pub posted_on: Option<DateTime<Utc>>,
    /// Reference of the reversing journal.
    #[serde(default)]
    pub reversal_reference: Option<String>,
}

/// Envelope every backend mutation answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResponse {
    /// Whether the backend applied the mutation.
    pub success: bool,
    /// Backend message, shown to the user verbatim.
    #[serde(default)]
    pub message: Option<String>,
    /// Returned fields.
    #[serde(flatten)]
    pub patch: RemotePatch,
}

impl RemoteResponse {
    /// A successful response without extra fields.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A successful response carrying `patch`.
    #[must_use]
    pub fn ok_with(patch: RemotePatch) -> Self {
        Self {
            success: true,
            message: None,
            patch,
        }
    }

    /// A refusal carrying the backend's message.
    #[must_use]
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            patch: RemotePatch::default(),
        }
    }
}

/// The backend call did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request timed out.
    #[error("Request timed out")]
    Timeout,
    /// The request could not be delivered or the backend answered with an error status.
    #[error("{0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("Invalid response from server: {0}")]
    Decode(String),
}

/// Workflow mutations exposed by the backend.
///
/// This trait is implemented by the client crate to perform the actual
/// HTTP calls, and by test doubles.
pub trait WorkflowRemote: Send + Sync {
    /// Approve a pending entity.
    fn approve(
        &self,
        key: &EntityKey,
        comments: Option<&str>,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;

    /// Reject a pending entity.
    fn reject(
        &self,
        key: &EntityKey,
        reason: &str,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;

    /// Send an entity back for approval.
    fn reset_approval(
        &self,
        key: &EntityKey,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;

    /// Post or pay an entity.
    fn post(&self, key: &EntityKey)
    -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;

    /// Reverse a settled entity.
    fn reverse(
        &self,
        key: &EntityKey,
        reason: &str,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;

    /// Move an entity to `status`.
    fn change_status(
        &self,
        key: &EntityKey,
        status: LifecycleStatus,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;

    /// Delete an entity.
    fn delete(
        &self,
        key: &EntityKey,
    ) -> impl Future<Output = Result<RemoteResponse, RemoteError>> + Send;
}
