//! Deterministic queue view over a courier's tasks.
//!
//! [`build_queue`] turns an unordered task collection into the day-by-day
//! route view couriers work from: calendar-date buckets in ascending order
//! with the unscheduled backlog last, counterparty groups inside each
//! bucket, and urgent tasks surfaced first within their group.
//!
//! The builder is pure and input-order independent. Tasks are first put in
//! canonical order (creation instant, then id), so two calls over the same
//! tasks produce identical queues no matter how the store happened to
//! return them.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::{Counterparty, CounterpartyKey, CounterpartyName, Task};

/// A courier's workload, bucketed by calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourierQueue {
    days: Vec<QueueDay>,
}

impl CourierQueue {
    /// Returns the day buckets, earliest first; the unscheduled bucket,
    /// when present, is last.
    #[must_use]
    pub fn days(&self) -> &[QueueDay] {
        &self.days
    }

    /// Returns the total number of tasks across all buckets.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.days.iter().map(QueueDay::task_count).sum()
    }

    /// Returns whether the queue holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Tasks sharing one calendar date, or the date-less backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueDay {
    date: Option<NaiveDate>,
    groups: Vec<QueueGroup>,
}

impl QueueDay {
    /// Returns the bucket's calendar date; `None` marks the unscheduled
    /// backlog bucket.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns the counterparty groups in first-appearance order.
    #[must_use]
    pub fn groups(&self) -> &[QueueGroup] {
        &self.groups
    }

    /// Returns the number of tasks in this bucket.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.groups.iter().map(QueueGroup::count).sum()
    }
}

/// Consecutive stops at one counterparty within a day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueGroup {
    key: CounterpartyKey,
    name: Option<CounterpartyName>,
    tasks: Vec<Task>,
}

impl QueueGroup {
    /// Returns the grouping key.
    #[must_use]
    pub const fn key(&self) -> CounterpartyKey {
        self.key
    }

    /// Returns the counterparty display name; `None` for the no-contact
    /// group.
    #[must_use]
    pub const fn name(&self) -> Option<&CounterpartyName> {
        self.name.as_ref()
    }

    /// Returns the group's tasks, urgent first.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns how many stops the group holds.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether the group should render with a multi-stop header.
    #[must_use]
    pub fn is_multi_stop(&self) -> bool {
        self.tasks.len() > 1
    }
}

/// Builds the deterministic queue view for the given tasks.
///
/// Eligibility filtering is the caller's concern; every task handed in
/// appears in the output exactly once.
#[must_use]
pub fn build_queue(tasks: &[Task]) -> CourierQueue {
    let canonical = canonicalize(tasks);

    let mut dated: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    let mut unscheduled: Vec<&Task> = Vec::new();
    for task in canonical {
        let Some(date) = task.scheduled_date() else {
            unscheduled.push(task);
            continue;
        };
        dated.entry(date).or_default().push(task);
    }

    let mut days: Vec<QueueDay> = dated
        .into_iter()
        .map(|(date, bucket)| QueueDay {
            date: Some(date),
            groups: group_by_counterparty(&bucket),
        })
        .collect();
    if !unscheduled.is_empty() {
        days.push(QueueDay {
            date: None,
            groups: group_by_counterparty(&unscheduled),
        });
    }

    CourierQueue { days }
}

/// Orders tasks by creation instant, then id, so the rest of the pipeline
/// never observes the caller's iteration order.
fn canonicalize(tasks: &[Task]) -> Vec<&Task> {
    let mut canonical: Vec<&Task> = tasks.iter().collect();
    canonical.sort_by_key(|task| (task.created_at(), task.id().into_inner()));
    canonical
}

/// Returns the grouping identity for a task: provider, else client, else
/// the shared no-contact bucket.
fn group_key(task: &Task) -> CounterpartyKey {
    task.counterparty()
        .map_or(CounterpartyKey::NoContact, Counterparty::key)
}

/// Sub-groups a day bucket by counterparty identity in first-appearance
/// order.
fn group_by_counterparty(tasks: &[&Task]) -> Vec<QueueGroup> {
    let mut order: Vec<CounterpartyKey> = Vec::new();
    let mut buckets: HashMap<CounterpartyKey, Vec<Task>> = HashMap::new();

    for &task in tasks {
        let key = group_key(task);
        let bucket = buckets.entry(key).or_default();
        if bucket.is_empty() {
            order.push(key);
        }
        bucket.push(task.clone());
    }

    order
        .into_iter()
        .filter_map(|key| buckets.remove(&key).map(|grouped| build_group(key, grouped)))
        .collect()
}

/// Assembles one group, surfacing urgent tasks ahead of normal ones while
/// keeping canonical order within each priority.
fn build_group(key: CounterpartyKey, mut tasks: Vec<Task>) -> QueueGroup {
    tasks.sort_by_key(|task| !task.priority().is_urgent());
    let name = tasks
        .first()
        .and_then(Task::counterparty)
        .map(|counterparty| counterparty.name().clone());

    QueueGroup { key, name, tasks }
}
