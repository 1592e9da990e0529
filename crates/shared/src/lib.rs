//! Shared identifiers, errors, and configuration for Leasedesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for actors and workflow entities
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
