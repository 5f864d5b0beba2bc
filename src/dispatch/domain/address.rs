//! Advisory address data carried by tasks.
//!
//! Addresses are display values resolved by an external normalization
//! collaborator before task creation. The engine never interprets them and
//! an unspecified address never blocks a lifecycle transition.

use serde::{Deserialize, Serialize};

/// Structured street address resolved by the address collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAddress {
    /// Street line, including the number where known.
    pub street: String,
    /// City or locality.
    pub city: String,
    /// Postal code, where known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

impl StructuredAddress {
    /// Creates a structured address from its required components.
    #[must_use]
    pub fn new(street: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: None,
        }
    }

    /// Sets the postal code.
    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }
}

/// Where a task is fulfilled, as far as the engine knows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskAddress {
    /// Free-text override supplied by the operator.
    Freeform {
        /// Operator-entered address text.
        text: String,
    },
    /// Structured address resolved by the address collaborator.
    Structured(StructuredAddress),
    /// No usable address; presentation decides how to render the gap.
    #[default]
    Unspecified,
}

impl TaskAddress {
    /// Creates a free-text address.
    #[must_use]
    pub fn freeform(text: impl Into<String>) -> Self {
        Self::Freeform { text: text.into() }
    }

    /// Returns a printable label, or `None` when the address is unspecified.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Freeform { text } => Some(text.clone()),
            Self::Structured(address) => Some(format!("{}, {}", address.street, address.city)),
            Self::Unspecified => None,
        }
    }

    /// Returns whether any address information is present.
    #[must_use]
    pub const fn is_specified(&self) -> bool {
        !matches!(self, Self::Unspecified)
    }
}
