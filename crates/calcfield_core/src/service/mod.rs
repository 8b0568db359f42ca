//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Provide stable entry points for callers (CLI, tests, embedders).
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - The service layer remains storage-agnostic.

pub mod account_service;
pub mod pair_service;
