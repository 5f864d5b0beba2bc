//! Error types for dispatch domain validation and parsing.

use super::{CourierId, TaskEvent, TaskId, TaskStatus};
use thiserror::Error;

/// Errors raised by dispatch domain rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The attempted lifecycle event is not allowed from the current status.
    #[error("cannot {event} task {task_id} in status {status}")]
    InvalidTransition {
        /// Task the event was applied to.
        task_id: TaskId,
        /// Status the task held when the event was attempted.
        status: TaskStatus,
        /// The rejected lifecycle event.
        event: TaskEvent,
    },

    /// The task is already held by a different courier.
    #[error("task {task_id} is already assigned to courier {holder}")]
    AlreadyAssigned {
        /// Task that was contested.
        task_id: TaskId,
        /// Courier currently holding the task.
        holder: CourierId,
    },

    /// The task has no assigned courier to release.
    #[error("task {0} has no assigned courier")]
    NotAssigned(TaskId),

    /// Finalization was attempted without the mandatory receipt photo.
    #[error("task {0} requires a receipt photo before completion")]
    MissingRequiredEvidence(TaskId),

    /// The counterparty display name is empty after trimming.
    #[error("counterparty name must not be empty")]
    EmptyCounterpartyName,

    /// The supplied photo contains no bytes.
    #[error("photo data must not be empty")]
    EmptyPhoto,

    /// The photo URL is empty after trimming.
    #[error("photo URL must not be empty")]
    EmptyPhotoUrl,

    /// The scheduled date is not a bare `YYYY-MM-DD` calendar date.
    #[error("invalid scheduled date '{0}', expected YYYY-MM-DD")]
    InvalidScheduledDate(String),
}

/// Error returned while parsing task statuses from storage or the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task kinds from storage or the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task kind: {0}")]
pub struct ParseTaskKindError(pub String);

/// Error returned while parsing priorities from storage or the boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);
