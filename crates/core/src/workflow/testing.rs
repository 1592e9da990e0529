//! Test doubles for the workflow engine.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::{Notify, Semaphore};

use crate::workflow::remote::{RemoteError, RemoteResponse, WorkflowRemote};
use crate::workflow::types::{EntityKey, LifecycleStatus};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub key: EntityKey,
    pub argument: Option<String>,
}

/// Mock backend that records calls and replays scripted responses.
///
/// With a gate installed, every call takes one permit from it before
/// answering, so a transition stays in flight until the test adds a permit.
#[derive(Default)]
pub struct RecordingRemote {
    calls: Mutex<Vec<RecordedCall>>,
    responses: Mutex<VecDeque<Result<RemoteResponse, RemoteError>>>,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Notify>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// Queues the answer for the next call. Unscripted calls succeed.
    pub fn respond_with(&self, response: Result<RemoteResponse, RemoteError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Notified each time a call reaches the backend.
    pub fn entered(&self) -> Arc<Notify> {
        Arc::clone(&self.entered)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn answer(
        &self,
        method: &'static str,
        key: &EntityKey,
        argument: Option<String>,
    ) -> Result<RemoteResponse, RemoteError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            key: key.clone(),
            argument,
        });
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let scripted = self.responses.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(RemoteResponse::ok()))
    }
}

impl WorkflowRemote for RecordingRemote {
    async fn approve(
        &self,
        key: &EntityKey,
        comments: Option<&str>,
    ) -> Result<RemoteResponse, RemoteError> {
        self.answer("approve", key, comments.map(str::to_string))
            .await
    }

    async fn reject(&self, key: &EntityKey, reason: &str) -> Result<RemoteResponse, RemoteError> {
        self.answer("reject", key, Some(reason.to_string())).await
    }

    async fn reset_approval(&self, key: &EntityKey) -> Result<RemoteResponse, RemoteError> {
        self.answer("reset_approval", key, None).await
    }

    async fn post(&self, key: &EntityKey) -> Result<RemoteResponse, RemoteError> {
        self.answer("post", key, None).await
    }

    async fn reverse(&self, key: &EntityKey, reason: &str) -> Result<RemoteResponse, RemoteError> {
        self.answer("reverse", key, Some(reason.to_string())).await
    }

    async fn change_status(
        &self,
        key: &EntityKey,
        status: LifecycleStatus,
    ) -> Result<RemoteResponse, RemoteError> {
        self.answer("change_status", key, Some(status.to_string()))
            .await
    }

    async fn delete(&self, key: &EntityKey) -> Result<RemoteResponse, RemoteError> {
        self.answer("delete", key, None).await
    }
}
