//! Builder resolving configured rules per member for one tenant and culture.

use crate::config::ValidationRuleConfig;
use crate::input::RuleValue;
use crate::provider::ValidatorFactoryProvider;
use std::sync::Arc;
use validated_core::{
    BuilderError, Member, OptionalMember, SharedEntityValidator, SharedMemberValidator,
    ValidationBuilder,
};

/// A [`ValidationBuilder`] whose member validators come from a rule pool.
///
/// Each `for_*` call resolves the rules configured for that member's owner
/// and name, for the builder's tenant and culture.
///
/// ## Example
///
/// ```rust,ignore
/// let validator = TenantValidationBuilder::<Person>::new(provider, rules, "ACME", "en-US")
///     .for_member(member!(Person, name))
///     .for_optional_member(member!(Person, email, deref))
///     .for_collection(member!(Person, tags, slice))
///     .build()?;
/// ```
pub struct TenantValidationBuilder<E> {
    inner: ValidationBuilder<E>,
    provider: ValidatorFactoryProvider,
    rules: Arc<[ValidationRuleConfig]>,
    tenant_id: String,
    culture_id: String,
}

impl<E: Sync + 'static> TenantValidationBuilder<E> {
    pub fn new(
        provider: ValidatorFactoryProvider,
        rules: impl Into<Arc<[ValidationRuleConfig]>>,
        tenant_id: impl Into<String>,
        culture_id: impl Into<String>,
    ) -> Self {
        Self {
            inner: ValidationBuilder::new(),
            provider,
            rules: rules.into(),
            tenant_id: tenant_id.into(),
            culture_id: culture_id.into(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn culture_id(&self) -> &str {
        &self.culture_id
    }

    fn resolve<T>(&self, owner: &str, name: &str) -> SharedMemberValidator<T>
    where
        T: RuleValue + ?Sized + 'static,
    {
        self.provider
            .create_validator(&self.rules, owner, name, &self.tenant_id, &self.culture_id)
    }

    fn map_inner(mut self, f: impl FnOnce(ValidationBuilder<E>) -> ValidationBuilder<E>) -> Self {
        self.inner = f(self.inner);
        self
    }

    pub fn for_member<F>(self, member: Member<E, F>) -> Self
    where
        F: RuleValue + ?Sized + 'static,
    {
        let validator = self.resolve::<F>(member.owner(), member.name());
        self.map_inner(|inner| inner.for_member(member, validator))
    }

    pub fn for_optional_member<F>(self, member: OptionalMember<E, F>) -> Self
    where
        F: RuleValue + ?Sized + 'static,
    {
        let validator = self.resolve::<F>(member.owner(), member.name());
        self.map_inner(|inner| inner.for_optional_member(member, validator))
    }

    /// Item rules of the member, applied to every element.
    pub fn for_each_primitive<T>(self, member: OptionalMember<E, [T]>) -> Self
    where
        T: RuleValue + 'static,
    {
        let validator = self.resolve::<T>(member.owner(), member.name());
        self.map_inner(|inner| inner.for_each_primitive(member, validator))
    }

    /// Collection rules of the member, applied to the collection as a whole.
    pub fn for_collection<T>(self, member: OptionalMember<E, [T]>) -> Self
    where
        T: Sync + 'static,
    {
        let validator = self.resolve::<[T]>(member.owner(), member.name());
        self.map_inner(|inner| inner.for_collection(member, validator))
    }

    /// `MemberComparison` rules of the member, evaluated against the entity.
    pub fn for_comparison<F: ?Sized>(self, member: Member<E, F>) -> Self
    where
        E: RuleValue,
    {
        let validator = self.provider.create_comparison_validator::<E>(
            &self.rules,
            member.owner(),
            member.name(),
            &self.tenant_id,
            &self.culture_id,
        );
        self.map_inner(|inner| inner.for_comparison(member, validator))
    }

    pub fn for_nested<N: Sync + 'static>(
        self,
        member: OptionalMember<E, N>,
        validator: SharedEntityValidator<N>,
    ) -> Self {
        self.map_inner(|inner| inner.for_nested(member, validator))
    }

    pub fn for_optional_nested<N: Sync + 'static>(
        self,
        member: OptionalMember<E, N>,
        validator: SharedEntityValidator<N>,
    ) -> Self {
        self.map_inner(|inner| inner.for_optional_nested(member, validator))
    }

    pub fn for_each_entity<N: Sync + 'static>(
        self,
        member: OptionalMember<E, [N]>,
        validator: SharedEntityValidator<N>,
    ) -> Self {
        self.map_inner(|inner| inner.for_each_entity(member, validator))
    }

    /// Add a hand-built validator alongside the configured ones.
    pub fn validator(self, validator: SharedEntityValidator<E>) -> Self {
        self.map_inner(|inner| inner.validator(validator))
    }

    pub fn when(self, condition: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.map_inner(|inner| inner.when(condition))
    }

    pub fn end_when(self) -> Self {
        self.map_inner(ValidationBuilder::end_when)
    }

    pub fn build(self) -> Result<SharedEntityValidator<E>, BuilderError> {
        self.inner.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{rule_types, CompareType, TargetType};
    use crate::input::{RuleInput, RuleRecord};
    use validated_core::{member, Cause, EntityValidator};

    struct Subscriber {
        name: String,
        email: Option<String>,
        tags: Vec<String>,
        joined: i32,
        renewed: i32,
    }

    impl RuleRecord for Subscriber {
        fn member(&self, name: &str) -> Option<RuleInput<'_>> {
            match name {
                "joined" => Some(self.joined.rule_input()),
                "renewed" => Some(self.renewed.rule_input()),
                _ => None,
            }
        }
    }

    impl RuleValue for Subscriber {
        fn rule_input(&self) -> RuleInput<'_> {
            RuleInput::Record(self)
        }
    }

    fn rules() -> Vec<ValidationRuleConfig> {
        vec![
            ValidationRuleConfig::new("Subscriber", "name", rule_types::STRING_LENGTH, "{DisplayName} is required")
                .with_display_name("Name")
                .with_length(Some(1), None),
            ValidationRuleConfig::new("Subscriber", "email", rule_types::REGEX, "{DisplayName} is not an email")
                .with_display_name("Email")
                .with_pattern("^[^@]+@[^@]+$"),
            ValidationRuleConfig::new("Subscriber", "tags", rule_types::STRING_LENGTH, "tag too long")
                .with_length(None, Some(5)),
            ValidationRuleConfig::new("Subscriber", "tags", rule_types::COLLECTION_LENGTH, "too many tags")
                .with_length(None, Some(2))
                .with_target(TargetType::Collection),
            ValidationRuleConfig::new("Subscriber", "renewed", rule_types::MEMBER_COMPARISON, "renewal before joining")
                .with_compare_property("joined", CompareType::GreaterThanOrEqual),
            ValidationRuleConfig::new("Subscriber", "name", rule_types::STRING_LENGTH, "{DisplayName} is too long for ACME")
                .with_display_name("Name")
                .with_length(None, Some(4))
                .for_tenant("ACME", "en-GB"),
        ]
    }

    fn validator(tenant: &str) -> SharedEntityValidator<Subscriber> {
        TenantValidationBuilder::<Subscriber>::new(ValidatorFactoryProvider::new(), rules(), tenant, "en-GB")
            .for_member(member!(Subscriber, name))
            .for_optional_member(member!(Subscriber, email, deref))
            .for_each_primitive(member!(Subscriber, tags, slice))
            .for_collection(member!(Subscriber, tags, slice))
            .for_comparison(member!(Subscriber, renewed))
            .build()
            .unwrap()
    }

    fn sample() -> Subscriber {
        Subscriber {
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            tags: vec!["math".into()],
            joined: 2020,
            renewed: 2024,
        }
    }

    #[tokio::test]
    async fn valid_entity_passes() {
        assert!(validator("ALL").check(&sample()).await.is_valid());
    }

    #[tokio::test]
    async fn failures_carry_member_paths_in_declaration_order() {
        let entity = Subscriber {
            name: String::new(),
            email: Some("nope".into()),
            tags: vec!["a".into(), "toolong".into(), "c".into()],
            joined: 2024,
            renewed: 2020,
        };
        let result = validator("ALL").check(&entity).await;
        let paths: Vec<_> = result.failures().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            ["Subscriber.name", "Subscriber.email", "Subscriber.tags[1]", "Subscriber.tags", "Subscriber.renewed"]
        );
        assert!(result.failures().iter().all(|e| e.cause == Cause::Validation));
    }

    #[tokio::test]
    async fn tenant_variant_replaces_default() {
        let entity = Subscriber {
            name: "Adelaide".into(),
            ..sample()
        };
        assert!(validator("ALL").check(&entity).await.is_valid());

        let result = validator("ACME").check(&entity).await;
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].failure_message, "Name is too long for ACME");
    }

    #[tokio::test]
    async fn absent_optional_member_is_skipped() {
        let entity = Subscriber {
            email: None,
            ..sample()
        };
        assert!(validator("ALL").check(&entity).await.is_valid());
    }

    #[test]
    fn unbalanced_scopes_fail_build() {
        let result = TenantValidationBuilder::<Subscriber>::new(ValidatorFactoryProvider::new(), rules(), "ALL", "en-GB")
            .when(|m: &Subscriber| m.email.is_some())
            .build();
        assert!(matches!(result, Err(BuilderError::UnclosedScopes(1))));
    }
}
