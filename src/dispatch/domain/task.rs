//! Task aggregate root and courier lifecycle state machine.

use super::{
    Counterparty, CourierId, OrganizationId, ParsePriorityError, ParseTaskKindError,
    ParseTaskStatusError, PhotoUrl, StoredEvidence, TaskAddress, TaskDomainError, TaskId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a courier does at the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Collect goods from the counterparty.
    Retire,
    /// Hand goods over to the counterparty.
    Deliver,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retire => "retire",
            Self::Deliver => "deliver",
        }
    }

    /// Returns whether tasks of this kind demand a receipt photo by default.
    ///
    /// Deliveries default to requiring evidence; collections do not. Either
    /// default can be overridden at creation.
    #[must_use]
    pub const fn default_photo_required(self) -> bool {
        matches!(self, Self::Deliver)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = ParseTaskKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "retire" => Ok(Self::Retire),
            "deliver" => Ok(Self::Deliver),
            _ => Err(ParseTaskKindError(value.to_owned())),
        }
    }
}

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Awaiting assignment; no courier holds the task.
    Pending,
    /// A courier has been proposed and must confirm.
    PendingConfirmation,
    /// The assigned courier has accepted the task.
    Confirmed,
    /// The task has been fulfilled and evidence recorded.
    Completed,
    /// The task was withdrawn before completion.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the status accepts no further lifecycle events.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "pending_confirmation" => Ok(Self::PendingConfirmation),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Urgency flag ordering tasks inside a queue group.
///
/// Priority affects presentation order only; it never gates a lifecycle
/// event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Standard scheduling.
    #[default]
    Normal,
    /// Surfaced ahead of normal tasks within its group.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Urgent => "urgent",
        }
    }

    /// Returns whether the task should be surfaced ahead of normal ones.
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        matches!(self, Self::Urgent)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "normal" => Ok(Self::Normal),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// Lifecycle events accepted by the task state machine.
///
/// The [`TaskEvent::allowed_from`] table is the single source of truth for
/// which statuses accept which event; the store's conditional updates reuse
/// it as their expected-status sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// Propose a courier; the task awaits their confirmation.
    Assign,
    /// The proposed courier accepts the task.
    Confirm,
    /// Release the task back to the unassigned pool.
    Unassign,
    /// Record completion evidence and close the task.
    Finalize,
    /// Withdraw the task before completion.
    Cancel,
}

impl TaskEvent {
    /// Returns the event name used in error reporting.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Confirm => "confirm",
            Self::Unassign => "unassign",
            Self::Finalize => "finalize",
            Self::Cancel => "cancel",
        }
    }

    /// Returns the statuses from which this event may fire.
    #[must_use]
    pub const fn allowed_from(self) -> &'static [TaskStatus] {
        match self {
            Self::Assign => &[TaskStatus::Pending, TaskStatus::PendingConfirmation],
            Self::Confirm => &[TaskStatus::PendingConfirmation],
            Self::Unassign => &[TaskStatus::PendingConfirmation, TaskStatus::Confirmed],
            Self::Finalize => &[TaskStatus::Confirmed],
            Self::Cancel => &[
                TaskStatus::Pending,
                TaskStatus::PendingConfirmation,
                TaskStatus::Confirmed,
            ],
        }
    }

    /// Returns whether the event may fire from the given status.
    #[must_use]
    pub fn permits(self, status: TaskStatus) -> bool {
        self.allowed_from().contains(&status)
    }
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a boundary `YYYY-MM-DD` string into a calendar date.
///
/// Parsing works on date components only, so datetime strings and offsets
/// are rejected rather than silently truncated to a possibly shifted day.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidScheduledDate`] when the input is not a
/// bare calendar date.
///
/// # Examples
///
/// ```
/// use reparto::dispatch::domain::parse_scheduled_date;
///
/// let date = parse_scheduled_date("2025-03-14").expect("valid date");
/// assert_eq!(date.to_string(), "2025-03-14");
/// assert!(parse_scheduled_date("2025-03-14T09:00:00Z").is_err());
/// ```
pub fn parse_scheduled_date(value: &str) -> Result<NaiveDate, TaskDomainError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TaskDomainError::InvalidScheduledDate(value.to_owned()))
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    organization_id: OrganizationId,
    kind: TaskKind,
    counterparty: Option<Counterparty>,
    address: TaskAddress,
    courier_id: Option<CourierId>,
    status: TaskStatus,
    scheduled_date: Option<NaiveDate>,
    priority: Priority,
    photo_required: bool,
    receipt_photo_url: Option<PhotoUrl>,
    additional_photo_urls: Vec<PhotoUrl>,
    linked_task_id: Option<TaskId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskParams {
    organization_id: OrganizationId,
    kind: TaskKind,
    counterparty: Option<Counterparty>,
    address: TaskAddress,
    scheduled_date: Option<NaiveDate>,
    priority: Priority,
    photo_required: Option<bool>,
    linked_task_id: Option<TaskId>,
}

impl NewTaskParams {
    /// Creates parameters for a task of the given kind.
    #[must_use]
    pub const fn new(organization_id: OrganizationId, kind: TaskKind) -> Self {
        Self {
            organization_id,
            kind,
            counterparty: None,
            address: TaskAddress::Unspecified,
            scheduled_date: None,
            priority: Priority::Normal,
            photo_required: None,
            linked_task_id: None,
        }
    }

    /// Sets the counterparty the courier meets at the stop.
    #[must_use]
    pub fn with_counterparty(mut self, counterparty: Counterparty) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    /// Sets the fulfilment address.
    #[must_use]
    pub fn with_address(mut self, address: TaskAddress) -> Self {
        self.address = address;
        self
    }

    /// Sets the scheduled calendar date.
    #[must_use]
    pub const fn with_scheduled_date(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    /// Sets the presentation priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Overrides the kind's default receipt-photo requirement.
    #[must_use]
    pub const fn with_photo_required(mut self, photo_required: bool) -> Self {
        self.photo_required = Some(photo_required);
        self
    }

    /// Links this task to the task it was cloned from.
    #[must_use]
    pub const fn with_linked_task(mut self, linked_task_id: TaskId) -> Self {
        self.linked_task_id = Some(linked_task_id);
        self
    }
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning organization.
    pub organization_id: OrganizationId,
    /// Persisted task kind.
    pub kind: TaskKind,
    /// Persisted counterparty, if any.
    pub counterparty: Option<Counterparty>,
    /// Persisted fulfilment address.
    pub address: TaskAddress,
    /// Persisted courier assignment, if any.
    pub courier_id: Option<CourierId>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted scheduled date, if any.
    pub scheduled_date: Option<NaiveDate>,
    /// Persisted presentation priority.
    pub priority: Priority,
    /// Persisted receipt-photo requirement.
    pub photo_required: bool,
    /// Persisted receipt photo location, if any.
    pub receipt_photo_url: Option<PhotoUrl>,
    /// Persisted supplementary photo locations.
    pub additional_photo_urls: Vec<PhotoUrl>,
    /// Persisted clone back-reference, if any.
    pub linked_task_id: Option<TaskId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new unassigned task in [`TaskStatus::Pending`].
    #[must_use]
    pub fn new(params: NewTaskParams, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let photo_required = params
            .photo_required
            .unwrap_or_else(|| params.kind.default_photo_required());

        Self {
            id: TaskId::new(),
            organization_id: params.organization_id,
            kind: params.kind,
            counterparty: params.counterparty,
            address: params.address,
            courier_id: None,
            status: TaskStatus::Pending,
            scheduled_date: params.scheduled_date,
            priority: params.priority,
            photo_required,
            receipt_photo_url: None,
            additional_photo_urls: Vec::new(),
            linked_task_id: params.linked_task_id,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            organization_id: data.organization_id,
            kind: data.kind,
            counterparty: data.counterparty,
            address: data.address,
            courier_id: data.courier_id,
            status: data.status,
            scheduled_date: data.scheduled_date,
            priority: data.priority,
            photo_required: data.photo_required,
            receipt_photo_url: data.receipt_photo_url,
            additional_photo_urls: data.additional_photo_urls,
            linked_task_id: data.linked_task_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the counterparty, if any.
    #[must_use]
    pub const fn counterparty(&self) -> Option<&Counterparty> {
        self.counterparty.as_ref()
    }

    /// Returns the fulfilment address.
    #[must_use]
    pub const fn address(&self) -> &TaskAddress {
        &self.address
    }

    /// Returns the assigned courier, if any.
    #[must_use]
    pub const fn courier_id(&self) -> Option<CourierId> {
        self.courier_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the scheduled calendar date, if any.
    #[must_use]
    pub const fn scheduled_date(&self) -> Option<NaiveDate> {
        self.scheduled_date
    }

    /// Returns the presentation priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns whether completion demands a receipt photo.
    #[must_use]
    pub const fn photo_required(&self) -> bool {
        self.photo_required
    }

    /// Returns the receipt photo location, if any.
    #[must_use]
    pub const fn receipt_photo_url(&self) -> Option<&PhotoUrl> {
        self.receipt_photo_url.as_ref()
    }

    /// Returns the supplementary photo locations.
    #[must_use]
    pub fn additional_photo_urls(&self) -> &[PhotoUrl] {
        &self.additional_photo_urls
    }

    /// Returns the clone back-reference, if any.
    #[must_use]
    pub const fn linked_task_id(&self) -> Option<TaskId> {
        self.linked_task_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Proposes a courier; the task moves to
    /// [`TaskStatus::PendingConfirmation`] until they confirm.
    ///
    /// Re-proposing the courier who already holds the task is accepted and
    /// refreshes the proposal.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] if the task already
    /// reached a terminal status, even when its last courier is still on
    /// record, or [`TaskDomainError::AlreadyAssigned`] if a different
    /// courier holds the task.
    pub fn assign(
        &mut self,
        courier_id: CourierId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        // A courier on a terminal task is history, not a live hold.
        if self.status.is_terminal() {
            return Err(self.invalid_transition(TaskEvent::Assign));
        }
        if let Some(holder) = self.courier_id.filter(|held| *held != courier_id) {
            return Err(TaskDomainError::AlreadyAssigned {
                task_id: self.id,
                holder,
            });
        }
        self.apply(TaskEvent::Assign, TaskStatus::PendingConfirmation, clock)?;
        self.courier_id = Some(courier_id);
        Ok(())
    }

    /// Records the proposed courier's acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] if the task is not
    /// awaiting confirmation, or [`TaskDomainError::NotAssigned`] if no
    /// courier is recorded on it.
    pub fn confirm(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if !TaskEvent::Confirm.permits(self.status) {
            return Err(self.invalid_transition(TaskEvent::Confirm));
        }
        if self.courier_id.is_none() {
            return Err(TaskDomainError::NotAssigned(self.id));
        }
        self.apply(TaskEvent::Confirm, TaskStatus::Confirmed, clock)
    }

    /// Claims the task for a courier in one step: assignment and
    /// confirmation together.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Task::assign`]; once assignment
    /// succeeds, confirmation cannot fail.
    pub fn self_assign(
        &mut self,
        courier_id: CourierId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.assign(courier_id, clock)?;
        self.confirm(clock)
    }

    /// Releases the task back to the unassigned pool, clearing the courier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] if the task already
    /// reached a terminal status, or [`TaskDomainError::NotAssigned`] if no
    /// courier holds the task.
    pub fn unassign(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.status.is_terminal() {
            return Err(self.invalid_transition(TaskEvent::Unassign));
        }
        if self.courier_id.is_none() {
            return Err(TaskDomainError::NotAssigned(self.id));
        }
        self.apply(TaskEvent::Unassign, TaskStatus::Pending, clock)?;
        self.courier_id = None;
        Ok(())
    }

    /// Checks that finalization would be accepted right now.
    ///
    /// `has_receipt_photo` states whether the pending finalization supplies
    /// a receipt; a receipt already recorded on the task also satisfies the
    /// evidence rule. Callers run this before uploading anything so a doomed
    /// finalization never reaches photo storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] if the task is not
    /// confirmed, or [`TaskDomainError::MissingRequiredEvidence`] if the
    /// task demands a receipt photo and none is available.
    pub fn ensure_can_finalize(&self, has_receipt_photo: bool) -> Result<(), TaskDomainError> {
        if !TaskEvent::Finalize.permits(self.status) {
            return Err(self.invalid_transition(TaskEvent::Finalize));
        }
        if self.photo_required && !has_receipt_photo && self.receipt_photo_url.is_none() {
            return Err(TaskDomainError::MissingRequiredEvidence(self.id));
        }
        Ok(())
    }

    /// Records uploaded evidence and completes the task.
    ///
    /// A supplied receipt overwrites any previous one; supplementary photo
    /// locations append to those already recorded.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Task::ensure_can_finalize`].
    pub fn finalize(
        &mut self,
        evidence: StoredEvidence,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_can_finalize(evidence.receipt_url().is_some())?;
        let (receipt_url, additional_urls) = evidence.into_parts();
        if let Some(url) = receipt_url {
            self.receipt_photo_url = Some(url);
        }
        self.additional_photo_urls.extend(additional_urls);
        self.apply(TaskEvent::Finalize, TaskStatus::Completed, clock)
    }

    /// Withdraws the task. The assigned courier, if any, stays recorded as
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] if the task already
    /// reached a terminal status.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.apply(TaskEvent::Cancel, TaskStatus::Cancelled, clock)
    }

    /// Moves the task to `next` if `event` permits the current status.
    fn apply(
        &mut self,
        event: TaskEvent,
        next: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !event.permits(self.status) {
            return Err(self.invalid_transition(event));
        }
        self.status = next;
        self.touch(clock);
        Ok(())
    }

    fn invalid_transition(&self, event: TaskEvent) -> TaskDomainError {
        TaskDomainError::InvalidTransition {
            task_id: self.id,
            status: self.status,
            event,
        }
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
