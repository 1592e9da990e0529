//! REST client for the Leasedesk back-office API.
//!
//! [`HttpWorkflowRemote`] implements the workflow engine's backend contract
//! over JSON and loads entity snapshots for the store.

pub mod dto;
pub mod error;
pub mod http;

pub use error::ClientError;
pub use http::HttpWorkflowRemote;
