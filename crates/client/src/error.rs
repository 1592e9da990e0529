//! Client error types.

use leasedesk_core::workflow::{EntityKey, RemoteError, UnknownStatus};
use leasedesk_shared::AppError;
use thiserror::Error;

/// Errors from loading snapshots or building the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    /// The entity does not exist on the backend.
    #[error("Entity not found: {0}")]
    NotFound(EntityKey),

    /// The call failed or the response could not be read.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The snapshot carried a status the engine does not know.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(#[from] UnknownStatus),

    /// The snapshot carried neither a version nor an update time, so it
    /// cannot be ordered against local commits.
    #[error("Snapshot of {0} has no version and no update time")]
    UnversionedSnapshot(EntityKey),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Build(message) => Self::Configuration(message),
            ClientError::NotFound(key) => Self::NotFound(key.to_string()),
            ClientError::Remote(_)
            | ClientError::InvalidSnapshot(_)
            | ClientError::UnversionedSnapshot(_) => {
                Self::ExternalService(err.to_string())
            }
        }
    }
}
