//! Task dispatch for delivery operations.
//!
//! This module implements the courier-facing task engine: creating delivery
//! and collection tasks, assigning them to couriers with race-safe claim
//! semantics, building the deterministic per-courier queue view, and
//! completing tasks behind the receipt-photo evidence gate. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
