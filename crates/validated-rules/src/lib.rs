//! # Validated Rules
//!
//! Externally configured validation rules, scoped by tenant, culture and
//! version, resolved at runtime into [`validated_core`] member validators.
//!
//! ## Resolution
//!
//! For one member of one type, [`ValidatorFactoryProvider::create_validator`]
//! filters the rule pool, groups variants of the same rule, keeps the latest
//! version of each and picks the best tenant/culture match. Each selected
//! config is materialized by the factory registered for its rule type and the
//! results are chained so that every failure is reported.
//!
//! Configuration problems never escape as errors during validation: they
//! surface as `RuleConfigError` entries (bad payloads) or `SystemError`
//! entries (unknown rule types), and are logged through `tracing`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use validated_rules::prelude::*;
//!
//! let rules: Vec<ValidationRuleConfig> = serde_json::from_str(&json)?;
//! let provider = ValidatorFactoryProvider::new();
//!
//! let validator = TenantValidationBuilder::<Person>::new(provider, rules, "ACME", "en-US")
//!     .for_member(member!(Person, name))
//!     .for_optional_member(member!(Person, email, deref))
//!     .build()?;
//!
//! let result = validator.check(&person).await;
//! ```

mod builder;
mod config;
mod error;
pub mod factories;
mod input;
mod provider;
mod resolution;
mod validator;


pub use builder::TenantValidationBuilder;
pub use config::{
    parse_rule_pool, rule_types, CompareType, RuleIdentity, TargetType, ValidationRuleConfig,
    ValidationVersion, ValueTypeHint, DEFAULT_CULTURE_ID, DEFAULT_TENANT_ID,
};
pub use error::RuleConfigurationError;
pub use factories::{RuleCheck, RuleValidatorFactory};
pub use input::{Literal, RuleInput, RuleRecord, RuleValue};
pub use provider::ValidatorFactoryProvider;
pub use resolution::{select_rules, ResolutionRequest, RuleScope};
pub use validator::{ConfiguredValidator, RuleValidator, SharedRuleValidator};

/// Prelude module for validated-rules
pub mod prelude {
    pub use crate::{
        rule_types, CompareType, RuleInput, RuleRecord, RuleValidator, RuleValidatorFactory,
        RuleValue, SharedRuleValidator, TargetType, TenantValidationBuilder, ValidationRuleConfig,
        ValidationVersion, ValidatorFactoryProvider, ValueTypeHint,
    };
    pub use validated_core::prelude::*;
}
