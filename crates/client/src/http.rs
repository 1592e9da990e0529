//! HTTP implementation of the workflow backend contract.

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

use leasedesk_core::workflow::{
    EntityKey, EntityKind, LifecycleStatus, RemoteError, RemoteResponse, WorkflowEntity,
    WorkflowRemote,
};
use leasedesk_shared::config::RemoteConfig;

use crate::dto::{ApproveBody, EntitySnapshotDto, ReasonBody, StatusBody};
use crate::error::ClientError;

/// URL segment for an entity kind.
#[must_use]
pub fn kind_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::PaymentVoucher => "payment-vouchers",
        EntityKind::LeaseRevenue => "lease-revenue",
        EntityKind::ContractTermination => "contract-terminations",
    }
}

/// Back-office API client.
#[derive(Debug, Clone)]
pub struct HttpWorkflowRemote {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpWorkflowRemote {
    /// Creates a client for `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the TLS backend cannot be initialized
    /// or `base_url` is not an absolute URL that can carry a path.
    pub fn new(
        base_url: impl AsRef<str>,
        timeout: Duration,
        api_token: Option<String>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| ClientError::Build(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Build(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }
        Ok(Self {
            client,
            base_url,
            api_token,
        })
    }

    /// Creates a client from the `remote` configuration section.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the TLS backend cannot be initialized
    /// or the configured base URL is invalid.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ClientError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.api_token.clone(),
        )
    }

    /// URL of an entity resource.
    ///
    /// The ID is appended as a single percent-encoded path segment, so `/`,
    /// `?` and `#` inside it never reach another resource.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` for the IDs `.` and `..`, which a
    /// path segment cannot express.
    pub fn entity_url(&self, key: &EntityKey) -> Result<Url, RemoteError> {
        self.resource_url(key, None)
    }

    fn action_url(&self, key: &EntityKey, action: &str) -> Result<Url, RemoteError> {
        self.resource_url(key, Some(action))
    }

    fn resource_url(&self, key: &EntityKey, action: Option<&str>) -> Result<Url, RemoteError> {
        let id = key.id.as_str();
        if matches!(id, "." | "..") {
            return Err(RemoteError::Transport(format!(
                "Entity id {id:?} cannot be used in a URL"
            )));
        }
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                RemoteError::Transport(format!("Base URL {} cannot carry a path", self.base_url))
            })?;
            segments.pop_if_empty().push(kind_path(key.kind)).push(id);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Loads the current snapshot of `key`.
    ///
    /// # Errors
    ///
    /// * `NotFound` on 404
    /// * `Remote` on transport failure, other error statuses or an undecodable body
    /// * `InvalidSnapshot` if the backend sent an unknown status
    pub async fn fetch(&self, key: &EntityKey) -> Result<WorkflowEntity, ClientError> {
        let url = self.entity_url(key)?;
        debug!(entity = %key, %url, "Fetching snapshot");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(key.clone()));
        }
        let response = check_status(response).await?;
        let dto: EntitySnapshotDto = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        dto.into_entity(key.clone())
    }

    async fn mutate(
        &self,
        key: &EntityKey,
        request: RequestBuilder,
    ) -> Result<RemoteResponse, RemoteError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(transport_error)
            .inspect_err(|err| warn!(entity = %key, error = %err, "Request failed"))?;

        let response = check_status(response)
            .await
            .inspect_err(|err| warn!(entity = %key, error = %err, "Backend returned an error"))?;

        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(RemoteResponse::ok());
        }
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Transport(err.to_string())
    }
}

/// Passes 2xx responses through. Error statuses become `Transport`,
/// keeping the backend's `message` field when the body has one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Server returned {status}"));
    Err(RemoteError::Transport(message))
}

impl WorkflowRemote for HttpWorkflowRemote {
    async fn approve(
        &self,
        key: &EntityKey,
        comments: Option<&str>,
    ) -> Result<RemoteResponse, RemoteError> {
        let request = self
            .client
            .post(self.action_url(key, "approve")?)
            .json(&ApproveBody { comments });
        self.mutate(key, request).await
    }

    async fn reject(&self, key: &EntityKey, reason: &str) -> Result<RemoteResponse, RemoteError> {
        let request = self
            .client
            .post(self.action_url(key, "reject")?)
            .json(&ReasonBody { reason });
        self.mutate(key, request).await
    }

    async fn reset_approval(&self, key: &EntityKey) -> Result<RemoteResponse, RemoteError> {
        let request = self.client.post(self.action_url(key, "reset-approval")?);
        self.mutate(key, request).await
    }

    async fn post(&self, key: &EntityKey) -> Result<RemoteResponse, RemoteError> {
        let request = self.client.post(self.action_url(key, "post")?);
        self.mutate(key, request).await
    }

    async fn reverse(&self, key: &EntityKey, reason: &str) -> Result<RemoteResponse, RemoteError> {
        let request = self
            .client
            .post(self.action_url(key, "reverse")?)
            .json(&ReasonBody { reason });
        self.mutate(key, request).await
    }

    async fn change_status(
        &self,
        key: &EntityKey,
        status: LifecycleStatus,
    ) -> Result<RemoteResponse, RemoteError> {
        let request = self
            .client
            .post(self.action_url(key, "status")?)
            .json(&StatusBody { status });
        self.mutate(key, request).await
    }

    async fn delete(&self, key: &EntityKey) -> Result<RemoteResponse, RemoteError> {
        let request = self.client.delete(self.entity_url(key)?);
        self.mutate(key, request).await
    }
}
