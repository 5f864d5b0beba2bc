//! Adapters implementing the dispatch ports.
//!
//! Adapters handle all infrastructure concerns while the domain remains
//! pure. The in-memory adapters back the test suites; durable persistence
//! belongs to the consuming application.

pub mod memory;
