//! Domain model for task dispatch.
//!
//! The dispatch domain models the task lifecycle (assignment, confirmation,
//! completion, cancellation), the courier claim rules, completion evidence,
//! and the deterministic queue view, while keeping all infrastructure
//! concerns outside of the domain boundary.

mod address;
mod counterparty;
mod error;
mod evidence;
mod ids;
mod queue;
mod task;

pub use address::{StructuredAddress, TaskAddress};
pub use counterparty::{Counterparty, CounterpartyKey, CounterpartyName};
pub use error::{ParsePriorityError, ParseTaskKindError, ParseTaskStatusError, TaskDomainError};
pub use evidence::{FinalizationEvidence, PhotoData, PhotoUrl, StoredEvidence};
pub use ids::{ClientId, CourierId, OrganizationId, ProviderId, TaskId};
pub use queue::{CourierQueue, QueueDay, QueueGroup, build_queue};
pub use task::{
    NewTaskParams, PersistedTaskData, Priority, Task, TaskEvent, TaskKind, TaskStatus,
    parse_scheduled_date,
};
