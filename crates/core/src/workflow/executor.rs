//! Workflow action executor.
//!
//! The executor is the only component that calls the backend. Each call runs
//! `Idle -> InFlight -> Committed | Failed` for one entity:
//!
//! - at most one transition per entity is in flight; a second request is
//!   refused with `Busy` instead of being queued
//! - the validator runs against the latest stored snapshot before any call
//! - failures are returned as-is and never retried
//! - a result that arrives after the initiating view went away is discarded

use chrono::Utc;
use dashmap::DashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::workflow::entity::WorkflowEntity;
use crate::workflow::error::WorkflowError;
use crate::workflow::remote::{RemoteResponse, WorkflowRemote};
use crate::workflow::role::{Actor, ApprovalPolicy};
use crate::workflow::store::{EntityStore, ReplaceOutcome};
use crate::workflow::types::{EntityKey, WorkflowAction};
use crate::workflow::validator::{ActionPayload, Permit, TransitionValidator};
use crate::workflow::vocabulary::Resolution;

/// A user's request to run an action on an entity.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    /// The target entity.
    pub key: EntityKey,
    /// The requested action.
    pub action: WorkflowAction,
    /// Who is asking.
    pub actor: Actor,
    /// Reason or comments.
    pub payload: ActionPayload,
}

/// Why a committed result was not written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The initiating view cancelled while the call was in flight.
    Cancelled,
    /// The entity was released from the store while the call was in flight.
    Detached,
    /// The store already holds a newer version.
    Superseded,
}

/// Result of a transition the backend accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The new snapshot is current in the store.
    Committed(Arc<WorkflowEntity>),
    /// The entity was deleted and released from the store.
    Deleted(EntityKey),
    /// The backend accepted the action but the result was not applied locally.
    Discarded {
        /// The snapshot the transition produced.
        snapshot: Arc<WorkflowEntity>,
        /// Why it was not applied.
        reason: DiscardReason,
    },
}

/// Marks an entity as busy until dropped.
struct InFlightGuard<'a> {
    in_flight: &'a DashSet<EntityKey>,
    key: EntityKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

/// Runs validated transitions against the backend and commits the results.
pub struct WorkflowExecutor<R: WorkflowRemote> {
    remote: Arc<R>,
    store: Arc<EntityStore>,
    policy: ApprovalPolicy,
    in_flight: DashSet<EntityKey>,
}

impl<R: WorkflowRemote> WorkflowExecutor<R> {
    /// Creates an executor over `store` that calls `remote`.
    #[must_use]
    pub fn new(remote: Arc<R>, store: Arc<EntityStore>, policy: ApprovalPolicy) -> Self {
        Self {
            remote,
            store,
            policy,
            in_flight: DashSet::new(),
        }
    }

    /// The store this executor commits into.
    #[must_use]
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// The approval policy used for validation.
    #[must_use]
    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Returns true while a transition for `key` is in flight.
    #[must_use]
    pub fn is_busy(&self, key: &EntityKey) -> bool {
        self.in_flight.contains(key)
    }

    fn acquire(&self, key: &EntityKey) -> Result<InFlightGuard<'_>, WorkflowError> {
        if !self.in_flight.insert(key.clone()) {
            return Err(WorkflowError::Busy(key.clone()));
        }
        Ok(InFlightGuard {
            in_flight: &self.in_flight,
            key: key.clone(),
        })
    }

    /// Validate and run one transition.
    ///
    /// `cancel` belongs to the initiating view. Cancelling it does not abort
    /// the backend call; the call still resolves and its result is discarded.
    ///
    /// # Errors
    /// * `Busy` if a transition for the entity is already in flight
    /// * `EntityNotFound` if the store holds no snapshot
    /// * any validator error, before the backend is called
    /// * `RemoteFailure` if the call fails or the backend refuses it
    pub async fn execute(
        &self,
        request: TransitionRequest,
        cancel: &CancellationToken,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let TransitionRequest {
            key,
            action,
            actor,
            payload,
        } = request;

        let _guard = self.acquire(&key)?;

        let snapshot = self
            .store
            .get(&key)
            .ok_or_else(|| WorkflowError::EntityNotFound(key.clone()))?;

        let permit =
            TransitionValidator::validate(&snapshot, action, &actor, &payload, &self.policy)
                .inspect_err(|err| {
                    debug!(entity = %key, %action, kind = %err.kind(), error = %err, "Transition refused");
                })?;

        let response = self.dispatch(&permit).await?;
        if !response.success {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("The server could not {action} this record"));
            warn!(entity = %key, %action, %message, "Backend refused transition");
            return Err(WorkflowError::RemoteFailure { action, message });
        }

        if permit.to == Resolution::Removed {
            self.store.release(&key);
            info!(entity = %key, %action, actor = %actor.id, "Entity deleted");
            return Ok(TransitionOutcome::Deleted(key));
        }

        let next = Arc::new(snapshot.advance(&permit, actor.id, &response.patch, Utc::now())?);

        if cancel.is_cancelled() {
            warn!(entity = %key, %action, "View cancelled; discarding committed result");
            return Ok(TransitionOutcome::Discarded {
                snapshot: next,
                reason: DiscardReason::Cancelled,
            });
        }

        let reason = match self.store.replace(Arc::clone(&next)) {
            ReplaceOutcome::Applied => {
                info!(
                    entity = %key,
                    %action,
                    actor = %actor.id,
                    from = %permit.from,
                    to = %permit.to,
                    version = next.version,
                    "Transition committed"
                );
                return Ok(TransitionOutcome::Committed(next));
            }
            ReplaceOutcome::Detached => DiscardReason::Detached,
            ReplaceOutcome::Stale { .. } => DiscardReason::Superseded,
        };
        warn!(entity = %key, %action, ?reason, "Discarding committed result");
        Ok(TransitionOutcome::Discarded {
            snapshot: next,
            reason,
        })
    }

    async fn dispatch(&self, permit: &Permit) -> Result<RemoteResponse, WorkflowError> {
        let key = &permit.key;
        let comment = permit.comment.as_deref();
        let result = match (permit.action, permit.to) {
            (WorkflowAction::Approve, _) => self.remote.approve(key, comment).await,
            (WorkflowAction::Reject, _) => {
                self.remote.reject(key, comment.unwrap_or_default()).await
            }
            (WorkflowAction::ResetApproval, _) => self.remote.reset_approval(key).await,
            (WorkflowAction::Post, _) => self.remote.post(key).await,
            (WorkflowAction::Reverse, _) => {
                self.remote.reverse(key, comment.unwrap_or_default()).await
            }
            (WorkflowAction::Delete, _) => self.remote.delete(key).await,
            (
                WorkflowAction::Submit | WorkflowAction::Cancel | WorkflowAction::Complete,
                Resolution::Status(status),
            ) => self.remote.change_status(key, status).await,
            (action, _) => {
                return Err(WorkflowError::InvalidTransition {
                    kind: key.kind,
                    from: permit.from,
                    action,
                });
            }
        };

        result.map_err(|err| {
            warn!(entity = %key, action = %permit.action, error = %err, "Backend call failed");
            WorkflowError::RemoteFailure {
                action: permit.action,
                message: err.to_string(),
            }
        })
    }
}
