//! Unit tests for the dispatch module.
//!
//! Tests are organised by concern: domain values and evidence rules, the
//! lifecycle state machine, the deterministic queue view, and the services
//! orchestrating them over the in-memory adapters.
