//! Failure entries produced by validators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a failure was reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cause {
    /// The input genuinely fails a rule.
    #[default]
    Validation,
    /// The rule itself is malformed or could not be materialized.
    RuleConfigError,
    /// An engine-level invariant was breached (absent entity, depth limit, missing factory).
    SystemError,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cause::Validation => "validation",
            Cause::RuleConfigError => "rule_config_error",
            Cause::SystemError => "system_error",
        };
        f.write_str(name)
    }
}

/// A single validation failure.
///
/// Entries are plain values: adapters re-home them with the `with_*` helpers
/// instead of mutating them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidEntry {
    /// Already-resolved, human-readable message
    pub failure_message: String,
    /// Dotted path to the failing value, e.g. `Person.contacts[1].email`
    pub path: String,
    /// Name of the member that failed
    pub property_name: String,
    /// Display name of the member that failed
    pub display_name: String,
    /// Classification of the failure
    #[serde(default)]
    pub cause: Cause,
}

impl InvalidEntry {
    /// Create a `Validation` entry.
    pub fn new(
        failure_message: impl Into<String>,
        path: impl Into<String>,
        property_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            failure_message: failure_message.into(),
            path: path.into(),
            property_name: property_name.into(),
            display_name: display_name.into(),
            cause: Cause::Validation,
        }
    }

    /// Create a `SystemError` entry where path, property and display name coincide.
    pub fn system_error(
        failure_message: impl Into<String>,
        path: impl Into<String>,
        property_name: impl Into<String>,
    ) -> Self {
        let property_name = property_name.into();
        Self::new(
            failure_message,
            path,
            property_name.clone(),
            property_name,
        )
        .with_cause(Cause::SystemError)
    }

    /// Replace the cause.
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = cause;
        self
    }

    /// Replace the path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Replace the failure message.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = message.into();
        self
    }

    /// Replace the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// True when the message carries no text and the entry would be meaningless.
    pub fn is_blank(&self) -> bool {
        self.failure_message.trim().is_empty()
    }
}

impl fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.failure_message)
    }
}
