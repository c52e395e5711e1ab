//! # Validated
//!
//! Composable, asynchronous validation that returns either the validated value
//! or every failure found in a single pass.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use validated_rs::prelude::*;
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let validator = ValidationBuilder::<Person>::new()
//!     .for_member(
//!         member!(Person, name),
//!         member_validator(|n: &String| !n.is_empty(), "name", "Name", "{DisplayName} is required"),
//!     )
//!     .for_member(
//!         member!(Person, age),
//!         member_validator(|a: &u32| *a >= 18, "age", "Age", "{DisplayName} must be 18 or over"),
//!     )
//!     .build()?;
//!
//! match validator.check(&person).await {
//!     Validated::Valid(person) => println!("{} is fine", person.name),
//!     Validated::Invalid(failures) => {
//!         for failure in &failures {
//!             println!("{failure}");
//!         }
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Accumulating**: composition never stops at the first failure
//! - **Path-aware**: failures name the member, e.g. `Person.contacts[1].email`
//! - **Graph-safe**: recursive structures are guarded against cycles and depth
//! - **Configurable**: tenant/culture-scoped rules loaded at runtime
//!
//! ## Optional Features
//!
//! - `rules` (default) - runtime rule configuration via `validated-rules`
//!
//! ```toml
//! [dependencies]
//! validated-rs = { version = "0.1", default-features = false }
//! ```

// Re-export core functionality
pub use validated_core::*;

// Re-export runtime rules (feature-gated)
#[cfg(feature = "rules")]
pub use validated_rules as rules;
#[cfg(feature = "rules")]
pub use validated_rules::{
    parse_rule_pool, rule_types, CompareType, RuleConfigurationError, RuleInput, RuleRecord,
    RuleValidator, RuleValidatorFactory, RuleValue, SharedRuleValidator, TargetType,
    TenantValidationBuilder, ValidationRuleConfig, ValidationVersion, ValidatorFactoryProvider,
    ValueTypeHint,
};

// Re-export commonly used external crates
pub use serde;
pub use serde_json;
pub use tracing;

/// Prelude module - import everything you need with `use validated_rs::prelude::*`
pub mod prelude {
    pub use validated_core::prelude::*;
    pub use validated_core::{combine2, combine3, combine4, Failures, ValidatedContextBuilder};

    #[cfg(feature = "rules")]
    pub use validated_rules::prelude::*;
}
