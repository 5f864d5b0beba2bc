//! Application services for dispatch orchestration.

mod assignment;
mod finalization;
mod lifecycle;

pub use assignment::{AssignmentError, AssignmentResult, AssignmentService};
pub use finalization::{FinalizationError, FinalizationResult, FinalizationService};
pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
