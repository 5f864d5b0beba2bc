//! Reparto: task lifecycle and courier-assignment engine.
//!
//! This crate provides the core engine behind a delivery dashboard: task
//! records move through a validated lifecycle (pending, awaiting courier
//! confirmation, confirmed, completed, cancelled), couriers claim tasks
//! with exactly-one-winner semantics, and completion is gated on receipt
//! photo evidence. A deterministic queue builder turns a courier's tasks
//! into the day-by-day route view the dashboard renders.
//!
//! # Architecture
//!
//! Reparto follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (storage, photos)
//!
//! # Modules
//!
//! - [`dispatch`]: Task lifecycle, courier assignment, queues, finalization

pub mod dispatch;
