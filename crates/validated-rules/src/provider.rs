//! Factory registry and per-member validator composition.

use crate::config::ValidationRuleConfig;
use crate::error::RuleConfigurationError;
use crate::factories::{builtin_factories, RuleValidatorFactory};
use crate::input::RuleValue;
use crate::resolution::{select_rules, ResolutionRequest, RuleScope};
use crate::validator::{
    ConfiguredValidator, FailingValidator, GuardedValidator, NoRulesValidator, SharedRuleValidator,
};
use dashmap::DashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};
use validated_core::{all_of, SharedMemberValidator};

/// Stands in for a rule type nobody registered: every value fails with a
/// `SystemError`.
struct MissingFactory;

impl RuleValidatorFactory for MissingFactory {
    fn create_from_configuration(
        &self,
        config: &ValidationRuleConfig,
    ) -> Result<SharedRuleValidator, RuleConfigurationError> {
        Ok(Arc::new(FailingValidator::missing_factory(config)))
    }
}

/// Thread-safe registry of rule-type factories.
///
/// Cloning is cheap and clones share the registry, so a factory added
/// through one handle is visible through all of them.
///
/// ## Example
///
/// ```rust,ignore
/// let provider = ValidatorFactoryProvider::new();
/// let name = provider.create_validator::<String>(&rules, "Person", "name", "ACME", "en-US");
/// let result = name.check(&person.name).await;
/// ```
#[derive(Clone)]
pub struct ValidatorFactoryProvider {
    factories: Arc<DashMap<String, Arc<dyn RuleValidatorFactory>>>,
}

impl Default for ValidatorFactoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorFactoryProvider {
    /// Registry preloaded with the built-in rule types.
    pub fn new() -> Self {
        let provider = Self::empty();
        for (rule_type, factory) in builtin_factories() {
            provider.factories.insert(rule_type.to_string(), factory);
        }
        provider
    }

    /// Registry with no factories at all.
    pub fn empty() -> Self {
        Self {
            factories: Arc::new(DashMap::new()),
        }
    }

    /// Register `factory` for `rule_type`, replacing any previous one.
    pub fn add_or_update_factory(
        &self,
        rule_type: impl Into<String>,
        factory: impl RuleValidatorFactory + 'static,
    ) {
        let rule_type = rule_type.into();
        let replaced = self
            .factories
            .insert(rule_type.clone(), Arc::new(factory))
            .is_some();
        debug!(rule_type = %rule_type, replaced, "rule factory registered");
    }

    pub fn has_factory(&self, rule_type: &str) -> bool {
        self.factories.contains_key(rule_type)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Factory for `config`'s rule type, or one that always fails.
    fn factory_for(&self, config: &ValidationRuleConfig) -> Arc<dyn RuleValidatorFactory> {
        if let Some(factory) = self.factories.get(&config.rule_type) {
            return Arc::clone(factory.value());
        }
        warn!(
            type_name = %config.type_full_name,
            property_name = %config.property_name,
            rule_type = %config.rule_type,
            tenant_id = %config.tenant_id,
            culture_id = %config.culture_id,
            "no factory registered for rule type"
        );
        Arc::new(MissingFactory)
    }

    /// Materialize one config. Factory errors and panics, at creation or
    /// while the rule runs, become `RuleConfigError` failures.
    fn materialize(&self, config: &ValidationRuleConfig) -> SharedRuleValidator {
        let factory = self.factory_for(config);
        let created = panic::catch_unwind(AssertUnwindSafe(|| {
            factory.create_from_configuration(config)
        }))
        .unwrap_or_else(|_| Err(RuleConfigurationError::FactoryPanicked(config.rule_type.clone())));

        match created {
            Ok(validator) => Arc::new(GuardedValidator::new(config, validator)),
            Err(err) => {
                error!(
                    type_name = %config.type_full_name,
                    property_name = %config.property_name,
                    rule_type = %config.rule_type,
                    tenant_id = %config.tenant_id,
                    culture_id = %config.culture_id,
                    version = %config.version,
                    error = %err,
                    "rule could not be materialized"
                );
                Arc::new(FailingValidator::config_error(config))
            }
        }
    }

    fn compose<T>(&self, rules: &[ValidationRuleConfig], request: ResolutionRequest<'_>) -> SharedMemberValidator<T>
    where
        T: RuleValue + ?Sized + 'static,
    {
        let validators = select_rules(rules, &request).into_iter().map(|config| {
            Arc::new(ConfiguredValidator::<T>::new(self.materialize(config)))
                as SharedMemberValidator<T>
        });
        all_of(validators).unwrap_or_else(|| {
            Arc::new(NoRulesValidator::new(
                request.type_name,
                request.property_name,
                request.tenant_id,
                request.culture_id,
            ))
        })
    }

    /// One validator for a member, composed from every applicable rule in
    /// `rules`.
    ///
    /// Item rules apply to scalar members, collection rules to slices and
    /// vectors (see [`RuleValue::TARGET`]). `MemberComparison` rules are
    /// left to [`create_comparison_validator`](Self::create_comparison_validator).
    pub fn create_validator<T>(
        &self,
        rules: &[ValidationRuleConfig],
        type_name: &str,
        property_name: &str,
        tenant_id: &str,
        culture_id: &str,
    ) -> SharedMemberValidator<T>
    where
        T: RuleValue + ?Sized + 'static,
    {
        let request = ResolutionRequest::new(
            type_name,
            property_name,
            tenant_id,
            culture_id,
            RuleScope::Value(T::TARGET),
        );
        self.compose(rules, request)
    }

    /// Validator for the `MemberComparison` rules of `property_name`, run
    /// against the owning entity.
    pub fn create_comparison_validator<E>(
        &self,
        rules: &[ValidationRuleConfig],
        type_name: &str,
        property_name: &str,
        tenant_id: &str,
        culture_id: &str,
    ) -> SharedMemberValidator<E>
    where
        E: RuleValue + 'static,
    {
        let request = ResolutionRequest::new(
            type_name,
            property_name,
            tenant_id,
            culture_id,
            RuleScope::Comparison,
        );
        self.compose(rules, request)
    }
}
