//! Rule configuration error types.

use thiserror::Error;

/// Why a configured rule could not be materialized or evaluated.
///
/// These never escape as `Err` from validation; the provider turns them into
/// `RuleConfigError` failures and logs them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleConfigurationError {
    #[error("rule '{rule_type}' requires {requirement}")]
    MissingPayload {
        rule_type: String,
        requirement: &'static str,
    },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("cannot interpret '{literal}' as {expected}")]
    InvalidLiteral {
        literal: String,
        expected: &'static str,
    },

    #[error("rule '{rule_type}' cannot be applied to a {actual} value")]
    UnsupportedInput {
        rule_type: String,
        actual: &'static str,
    },

    #[error("member '{0}' is not exposed for comparison")]
    UnknownMember(String),

    #[error("factory for rule '{0}' panicked")]
    FactoryPanicked(String),
}

impl RuleConfigurationError {
    pub(crate) fn missing(rule_type: &str, requirement: &'static str) -> Self {
        Self::MissingPayload {
            rule_type: rule_type.to_string(),
            requirement,
        }
    }

    pub(crate) fn unsupported(rule_type: &str, actual: &'static str) -> Self {
        Self::UnsupportedInput {
            rule_type: rule_type.to_string(),
            actual,
        }
    }

    pub(crate) fn literal(literal: &str, expected: &'static str) -> Self {
        Self::InvalidLiteral {
            literal: literal.to_string(),
            expected,
        }
    }
}
