//! Step definitions for courier workflow BDD scenarios.


pub mod given;
pub mod then;
