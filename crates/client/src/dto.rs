//! Wire formats of the back-office API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use leasedesk_core::workflow::{ApprovalStatus, EntityKey, LifecycleStatus, WorkflowEntity};

use crate::error::ClientError;

/// Body of `POST .../approve`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody<'a> {
    /// Optional approver comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<&'a str>,
}

/// Body of `POST .../reject` and `POST .../reverse`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonBody<'a> {
    /// Mandatory reason.
    pub reason: &'a str,
}

/// Body of `POST .../status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    /// Target lifecycle status.
    pub status: LifecycleStatus,
}

/// Entity snapshot as returned by `GET {kind-path}/{id}`.
///
/// Statuses arrive as free-form strings and are parsed strictly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshotDto {
    /// Lifecycle status string.
    pub status: String,
    /// Approval status string, if any.
    #[serde(default)]
    pub approval_status: Option<String>,
    /// Amount used for approval limits.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Server-side version.
    #[serde(default)]
    pub version: Option<u64>,
    /// Last modification time; orders snapshots when `version` is absent.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Approver name.
    #[serde(default)]
    pub approved_by: Option<String>,
    /// Approval time.
    #[serde(default)]
    pub approved_on: Option<DateTime<Utc>>,
    /// Rejecting user.
    #[serde(default)]
    pub rejected_by: Option<String>,
    /// Rejection time.
    #[serde(default)]
    pub rejected_on: Option<DateTime<Utc>>,
    /// Posting or payment time.
    #[serde(default)]
    pub posted_on: Option<DateTime<Utc>>,
    /// Reference of the reversing journal.
    #[serde(default)]
    pub reversal_reference: Option<String>,
}

impl EntitySnapshotDto {
    /// Converts the wire snapshot into an engine snapshot for `key`.
    ///
    /// Without a server `version`, the `updatedAt` time in milliseconds
    /// becomes the version, so a later backend change still outranks a
    /// local commit made on top of an earlier fetch.
    ///
    /// # Errors
    ///
    /// * `InvalidSnapshot` if either status string is not recognized
    /// * `UnversionedSnapshot` if there is no version and no usable `updatedAt`
    pub fn into_entity(self, key: EntityKey) -> Result<WorkflowEntity, ClientError> {
        let status = LifecycleStatus::parse(&self.status)?;
        let approval = match self.approval_status.as_deref() {
            Some(raw) => ApprovalStatus::parse(raw)?,
            None => None,
        };
        let version = self
            .version
            .or_else(|| {
                self.updated_at
                    .and_then(|at| u64::try_from(at.timestamp_millis()).ok())
            })
            .ok_or_else(|| ClientError::UnversionedSnapshot(key.clone()))?;

        let mut entity = WorkflowEntity::new(key, status)
            .with_approval(approval)
            .with_version(version);
        entity.amount = self.amount;
        if let Some(updated_at) = self.updated_at {
            entity.updated_at = updated_at;
        }
        entity.approved_by = self.approved_by;
        entity.approved_on = self.approved_on;
        entity.rejected_by = self.rejected_by;
        entity.rejected_on = self.rejected_on;
        entity.posted_on = self.posted_on;
        entity.reversal_reference = self.reversal_reference;
        Ok(entity)
    }
}
