//! Core business logic for Leasedesk.
//!
//! This crate contains the workflow lifecycle engine with ZERO web or
//! database dependencies. The backend is reached only through the
//! [`workflow::WorkflowRemote`] trait.
//!
//! # Modules
//!
//! - `workflow` - Entity lifecycle: vocabulary, validation, execution, store

pub mod workflow;
