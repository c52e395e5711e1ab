//! Materialized rules and their bridge to typed member validators.

use crate::config::ValidationRuleConfig;
use crate::input::{RuleInput, RuleValue};
use async_trait::async_trait;
use futures_util::FutureExt;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use validated_core::{
    placeholders, Cause, InvalidEntry, MemberValidator, MessageTemplate, Validated,
};

/// A configured rule, ready to run against type-erased input.
///
/// An empty `path` means "report under the rule's property name".
#[async_trait]
pub trait RuleValidator: Send + Sync {
    async fn validate(
        &self,
        value: RuleInput<'_>,
        compare_to: Option<RuleInput<'_>>,
        path: &str,
        cancel: &CancellationToken,
    ) -> Validated<()>;
}

pub type SharedRuleValidator = Arc<dyn RuleValidator>;

/// The parts of a configuration every materialized rule needs for reporting.
#[derive(Debug, Clone)]
pub(crate) struct RuleMeta {
    pub(crate) config: ValidationRuleConfig,
}

impl RuleMeta {
    pub(crate) fn new(config: &ValidationRuleConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub(crate) fn path<'p>(&'p self, path: &'p str) -> &'p str {
        if path.is_empty() {
            &self.config.property_name
        } else {
            path
        }
    }

    /// Render the configured message with the value and every payload
    /// placeholder the rule carries.
    pub(crate) fn render(&self, value: &RuleInput<'_>, compare_to: Option<&RuleInput<'_>>) -> String {
        let config = &self.config;
        let compare_to = compare_to
            .map(ToString::to_string)
            .or_else(|| config.compare_value.clone());
        MessageTemplate::new(&config.failure_message)
            .param(placeholders::PROPERTY_NAME, &config.property_name)
            .param(placeholders::DISPLAY_NAME, &config.display_name)
            .param(placeholders::VALIDATED_VALUE, value)
            .param_opt(placeholders::COMPARE_TO_VALUE, compare_to)
            .param_opt(placeholders::COMPARE_PROPERTY_NAME, config.compare_property_name.as_ref())
            .param_opt(placeholders::MIN_LENGTH, config.min_length)
            .param_opt(placeholders::MAX_LENGTH, config.max_length)
            .param_opt(placeholders::MIN_VALUE, config.min_value.as_ref())
            .param_opt(placeholders::MAX_VALUE, config.max_value.as_ref())
            .param_opt(placeholders::PATTERN, config.pattern.as_ref())
            .render()
    }

    pub(crate) fn failure(
        &self,
        path: &str,
        value: &RuleInput<'_>,
        compare_to: Option<&RuleInput<'_>>,
    ) -> InvalidEntry {
        InvalidEntry::new(
            self.render(value, compare_to),
            self.path(path),
            &self.config.property_name,
            &self.config.display_name,
        )
    }

    pub(crate) fn config_error(&self, path: &str) -> InvalidEntry {
        InvalidEntry::new(
            format!(
                "The '{}' rule for {} is misconfigured.",
                self.config.rule_type, self.config.display_name
            ),
            self.path(path),
            &self.config.property_name,
            &self.config.display_name,
        )
        .with_cause(Cause::RuleConfigError)
    }

    pub(crate) fn system_error(&self, path: &str) -> InvalidEntry {
        InvalidEntry::new(
            format!(
                "No validator is registered for rule type '{}'; {} could not be validated.",
                self.config.rule_type, self.config.display_name
            ),
            self.path(path),
            &self.config.property_name,
            &self.config.display_name,
        )
        .with_cause(Cause::SystemError)
    }
}

/// A rule that always fails with a fixed cause.
pub(crate) struct FailingValidator {
    meta: RuleMeta,
    cause: Cause,
}

impl FailingValidator {
    pub(crate) fn config_error(config: &ValidationRuleConfig) -> Self {
        Self {
            meta: RuleMeta::new(config),
            cause: Cause::RuleConfigError,
        }
    }

    pub(crate) fn missing_factory(config: &ValidationRuleConfig) -> Self {
        Self {
            meta: RuleMeta::new(config),
            cause: Cause::SystemError,
        }
    }
}

#[async_trait]
impl RuleValidator for FailingValidator {
    async fn validate(
        &self,
        _value: RuleInput<'_>,
        _compare_to: Option<RuleInput<'_>>,
        path: &str,
        _cancel: &CancellationToken,
    ) -> Validated<()> {
        let entry = match self.cause {
            Cause::SystemError => self.meta.system_error(path),
            _ => self.meta.config_error(path),
        };
        Validated::invalid_entry(entry)
    }
}

/// Runs a materialized rule and turns a panic inside it into a
/// `RuleConfigError` entry.
pub(crate) struct GuardedValidator {
    meta: RuleMeta,
    inner: SharedRuleValidator,
}

impl GuardedValidator {
    pub(crate) fn new(config: &ValidationRuleConfig, inner: SharedRuleValidator) -> Self {
        Self {
            meta: RuleMeta::new(config),
            inner,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[async_trait]
impl RuleValidator for GuardedValidator {
    async fn validate(
        &self,
        value: RuleInput<'_>,
        compare_to: Option<RuleInput<'_>>,
        path: &str,
        cancel: &CancellationToken,
    ) -> Validated<()> {
        let run = self.inner.validate(value, compare_to, path, cancel);
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let config = &self.meta.config;
                error!(
                    type_name = %config.type_full_name,
                    property_name = %config.property_name,
                    rule_type = %config.rule_type,
                    tenant_id = %config.tenant_id,
                    culture_id = %config.culture_id,
                    path,
                    panic = panic_message(payload.as_ref()),
                    "configured rule panicked"
                );
                Validated::invalid_entry(self.meta.config_error(path))
            }
        }
    }
}

/// Adapts a type-erased rule to a typed member validator.
pub struct ConfiguredValidator<T: ?Sized> {
    inner: SharedRuleValidator,
    _value: PhantomData<fn(&T)>,
}

impl<T: ?Sized> ConfiguredValidator<T> {
    pub fn new(inner: SharedRuleValidator) -> Self {
        Self {
            inner,
            _value: PhantomData,
        }
    }
}

#[async_trait]
impl<T: RuleValue + ?Sized> MemberValidator<T> for ConfiguredValidator<T> {
    async fn validate<'a>(
        &self,
        value: &'a T,
        path: &str,
        compare_to: Option<&'a T>,
        cancel: &CancellationToken,
    ) -> Validated<&'a T> {
        self.inner
            .validate(
                value.rule_input(),
                compare_to.map(|other| other.rule_input()),
                path,
                cancel,
            )
            .await
            .map(|()| value)
    }
}

/// Used when no configured rule applies to a member: always valid.
pub(crate) struct NoRulesValidator {
    type_name: String,
    property_name: String,
    tenant_id: String,
    culture_id: String,
}

impl NoRulesValidator {
    pub(crate) fn new(type_name: &str, property_name: &str, tenant_id: &str, culture_id: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            property_name: property_name.to_string(),
            tenant_id: tenant_id.to_string(),
            culture_id: culture_id.to_string(),
        }
    }
}

#[async_trait]
impl<T: ?Sized + Sync> MemberValidator<T> for NoRulesValidator {
    async fn validate<'a>(
        &self,
        value: &'a T,
        path: &str,
        _compare_to: Option<&'a T>,
        _cancel: &CancellationToken,
    ) -> Validated<&'a T> {
        debug!(
            type_name = %self.type_name,
            property_name = %self.property_name,
            tenant_id = %self.tenant_id,
            culture_id = %self.culture_id,
            path,
            "no configured rules apply"
        );
        Validated::valid(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rule_types;

    fn config() -> ValidationRuleConfig {
        ValidationRuleConfig::new(
            "Person",
            "age",
            rule_types::RANGE,
            "{DisplayName} ({ValidatedValue}) must be between {MinValue} and {MaxValue}",
        )
        .with_display_name("Age")
        .with_min_value("18")
        .with_max_value("65")
    }

    #[test]
    fn render_substitutes_payload_placeholders() {
        let meta = RuleMeta::new(&config());
        let text = meta.render(&RuleInput::Integer(12), None);
        assert_eq!(text, "Age (12) must be between 18 and 65");
    }

    #[test]
    fn empty_path_uses_property_name() {
        let meta = RuleMeta::new(&config());
        let entry = meta.failure("", &RuleInput::Integer(12), None);
        assert_eq!(entry.path, "age");
        assert_eq!(entry.cause, Cause::Validation);
        assert_eq!(meta.failure("Person.age", &RuleInput::Integer(1), None).path, "Person.age");
    }

    #[tokio::test]
    async fn failing_validator_reports_its_cause() {
        let cancel = CancellationToken::new();
        let missing = FailingValidator::missing_factory(&config());
        let result = missing.validate(RuleInput::Integer(30), None, "Person.age", &cancel).await;
        assert_eq!(result.failures()[0].cause, Cause::SystemError);

        let broken = FailingValidator::config_error(&config());
        let result = broken.validate(RuleInput::Integer(30), None, "Person.age", &cancel).await;
        assert_eq!(result.failures()[0].cause, Cause::RuleConfigError);
        assert_eq!(result.failures()[0].display_name, "Age");
    }

    #[tokio::test]
    async fn configured_validator_returns_the_typed_value() {
        struct Adult;

        #[async_trait]
        impl RuleValidator for Adult {
            async fn validate(
                &self,
                value: RuleInput<'_>,
                _compare_to: Option<RuleInput<'_>>,
                path: &str,
                _cancel: &CancellationToken,
            ) -> Validated<()> {
                match value {
                    RuleInput::Integer(age) if age >= 18 => Validated::valid(()),
                    _ => Validated::invalid_entry(InvalidEntry::new("minor", path, "age", "Age")),
                }
            }
        }

        let validator = ConfiguredValidator::<u32>::new(Arc::new(Adult));
        assert_eq!(validator.check(&30).await, Validated::Valid(&30));
        assert!(!validator.check(&12).await.is_valid());
    }

    #[tokio::test]
    async fn no_rules_is_always_valid() {
        let validator = NoRulesValidator::new("Person", "age", "ALL", "en-GB");
        let result = MemberValidator::<str>::check(&validator, "anything").await;
        assert!(result.is_valid());
    }
}
