//! Port contracts for task dispatch.
//!
//! Ports define infrastructure-agnostic interfaces used by dispatch
//! services.

pub mod photos;
pub mod store;

pub use photos::{PhotoStorage, PhotoStorageError, PhotoStorageResult};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult};
