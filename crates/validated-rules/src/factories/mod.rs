//! Factories that turn a [`ValidationRuleConfig`] into a runnable rule.
//!
//! Each built-in rule type pairs a factory, which parses and checks the
//! payload once, with a synchronous [`RuleCheck`] wrapped by
//! [`CheckValidator`] for reporting.

mod collection;
mod comparison;
mod numeric;
mod temporal;
mod text;

pub use collection::CollectionLengthFactory;
pub use comparison::{CompareToValueFactory, MemberComparisonFactory};
pub use numeric::{PrecisionScaleFactory, RangeFactory};
pub use temporal::{RollingDateFactory, RollingUnit};
pub use text::{RegexFactory, StringLengthFactory, UrlFormatFactory};

use crate::config::{rule_types, ValidationRuleConfig};
use crate::error::RuleConfigurationError;
use crate::input::RuleInput;
use crate::validator::{RuleMeta, RuleValidator, SharedRuleValidator};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;
use validated_core::Validated;

/// Materializes one rule type.
///
/// Closures with the same signature are factories too:
///
/// ```rust,ignore
/// provider.add_or_update_factory("NotEmpty", |config: &ValidationRuleConfig| {
///     Ok(Arc::new(NotEmpty::new(config)) as SharedRuleValidator)
/// });
/// ```
pub trait RuleValidatorFactory: Send + Sync {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError>;
}

impl<F> RuleValidatorFactory for F
where
    F: Fn(&ValidationRuleConfig) -> Result<SharedRuleValidator, RuleConfigurationError>
        + Send
        + Sync,
{
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        self(config)
    }
}

/// Synchronous predicate behind a built-in rule.
///
/// `Err` means the rule cannot judge this input (wrong kind of value,
/// missing comparison operand) and is reported as a configuration error.
pub trait RuleCheck: Send + Sync {
    fn evaluate(
        &self,
        value: RuleInput<'_>,
        compare_to: Option<RuleInput<'_>>,
    ) -> Result<bool, RuleConfigurationError>;
}

/// Runs a [`RuleCheck`] and reports its outcome.
///
/// Absent values pass: whether a member must be present is the adapter's
/// concern, not the rule's.
pub struct CheckValidator<C> {
    meta: RuleMeta,
    check: C,
}

impl<C: RuleCheck + 'static> CheckValidator<C> {
    pub fn shared(config: &ValidationRuleConfig, check: C) -> SharedRuleValidator {
        Arc::new(Self {
            meta: RuleMeta::new(config),
            check,
        })
    }
}

#[async_trait]
impl<C: RuleCheck> RuleValidator for CheckValidator<C> {
    async fn validate(
        &self,
        value: RuleInput<'_>,
        compare_to: Option<RuleInput<'_>>,
        path: &str,
        _cancel: &CancellationToken,
    ) -> Validated<()> {
        if value.is_absent() {
            return Validated::valid(());
        }
        match self.check.evaluate(value, compare_to) {
            Ok(true) => Validated::valid(()),
            Ok(false) => {
                Validated::invalid_entry(self.meta.failure(path, &value, compare_to.as_ref()))
            }
            Err(err) => {
                let config = &self.meta.config;
                error!(
                    type_name = %config.type_full_name,
                    property_name = %config.property_name,
                    rule_type = %config.rule_type,
                    tenant_id = %config.tenant_id,
                    culture_id = %config.culture_id,
                    error = %err,
                    "configured rule could not be evaluated"
                );
                Validated::invalid_entry(self.meta.config_error(path))
            }
        }
    }
}

/// Factories registered by [`ValidatorFactoryProvider::new`](crate::ValidatorFactoryProvider::new).
pub fn builtin_factories() -> Vec<(&'static str, Arc<dyn RuleValidatorFactory>)> {
    fn entry(
        rule_type: &'static str,
        factory: impl RuleValidatorFactory + 'static,
    ) -> (&'static str, Arc<dyn RuleValidatorFactory>) {
        (rule_type, Arc::new(factory))
    }

    vec![
        entry(rule_types::REGEX, RegexFactory),
        entry(rule_types::STRING_LENGTH, StringLengthFactory),
        entry(rule_types::URL_FORMAT, UrlFormatFactory),
        entry(rule_types::RANGE, RangeFactory),
        entry(rule_types::PRECISION_SCALE, PrecisionScaleFactory),
        entry(rule_types::COMPARE_TO_VALUE, CompareToValueFactory),
        entry(rule_types::MEMBER_COMPARISON, MemberComparisonFactory),
        entry(rule_types::ROLLING_DATE, RollingDateFactory),
        entry(rule_types::COLLECTION_LENGTH, CollectionLengthFactory),
    ]
}

/// Check a length against optional inclusive bounds.
pub(crate) fn within_length(len: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.map_or(true, |min| len >= min) && max.map_or(true, |max| len <= max)
}

/// Read a required length bound pair, rejecting a rule with neither.
pub(crate) fn length_bounds(
    config: &ValidationRuleConfig,
) -> Result<(Option<usize>, Option<usize>), RuleConfigurationError> {
    match (config.min_length, config.max_length) {
        (None, None) => Err(RuleConfigurationError::missing(
            &config.rule_type,
            "a minimum or maximum length",
        )),
        (Some(min), Some(max)) if min > max => Err(RuleConfigurationError::InvalidLiteral {
            literal: format!("{min}..{max}"),
            expected: "a length range with min <= max",
        }),
        bounds => Ok(bounds),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use validated_core::InvalidEntry;

    /// Materialize `config` with `factory` and run it once.
    pub(crate) async fn run(
        factory: &dyn RuleValidatorFactory,
        config: &ValidationRuleConfig,
        value: RuleInput<'_>,
        compare_to: Option<RuleInput<'_>>,
    ) -> Result<Vec<InvalidEntry>, RuleConfigurationError> {
        let validator = factory.create_from_configuration(config)?;
        let cancel = CancellationToken::new();
        let result = validator.validate(value, compare_to, "", &cancel).await;
        Ok(result.failures().to_vec())
    }
}
