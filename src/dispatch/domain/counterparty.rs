//! Counterparty identity for tasks.
//!
//! A task is fulfilled either at a client's site or at a provider's site,
//! never both. Modelling the counterparty as a tagged enum makes that
//! mutual exclusion structural: there is no representable task carrying
//! both a client and a provider. Contact-less tasks carry no counterparty
//! at all and group under the shared no-contact bucket.

use super::{ClientId, ProviderId, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated counterparty display name.
///
/// Names are denormalized display data maintained by the task store; the
/// engine only requires them to be non-empty so queue groups always have a
/// printable label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterpartyName(String);

impl CounterpartyName {
    /// Creates a validated counterparty name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCounterpartyName`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyCounterpartyName);
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CounterpartyName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CounterpartyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The party a task is fulfilled for: a client or a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Counterparty {
    /// Task is fulfilled at a client's site.
    Client {
        /// Client identifier.
        id: ClientId,
        /// Denormalized client display name.
        name: CounterpartyName,
    },
    /// Task is fulfilled at a provider's site.
    Provider {
        /// Provider identifier.
        id: ProviderId,
        /// Denormalized provider display name.
        name: CounterpartyName,
    },
}

impl Counterparty {
    /// Creates a client counterparty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCounterpartyName`] when the display
    /// name is empty after trimming.
    pub fn client(id: ClientId, name: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self::Client {
            id,
            name: CounterpartyName::new(name)?,
        })
    }

    /// Creates a provider counterparty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyCounterpartyName`] when the display
    /// name is empty after trimming.
    pub fn provider(id: ProviderId, name: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self::Provider {
            id,
            name: CounterpartyName::new(name)?,
        })
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &CounterpartyName {
        match self {
            Self::Client { name, .. } | Self::Provider { name, .. } => name,
        }
    }

    /// Returns the identity key used for queue grouping.
    #[must_use]
    pub const fn key(&self) -> CounterpartyKey {
        match self {
            Self::Client { id, .. } => CounterpartyKey::Client(*id),
            Self::Provider { id, .. } => CounterpartyKey::Provider(*id),
        }
    }
}

/// Grouping key identifying which counterparty bucket a task belongs to.
///
/// Tasks without a counterparty share the single [`CounterpartyKey::NoContact`]
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CounterpartyKey {
    /// Grouped by provider identity.
    Provider(ProviderId),
    /// Grouped by client identity.
    Client(ClientId),
    /// Shared bucket for contact-less tasks.
    NoContact,
}
