//! # Validated Core
//!
//! Composable, asynchronous validation producing either the validated value or
//! every failure found in one pass.
//!
//! ## Building blocks
//!
//! - [`Validated`]: `Valid(value)` or a non-empty list of [`InvalidEntry`]
//! - [`MemberValidator`]: checks one value
//! - [`EntityValidator`]: checks an entity and its members
//! - [`and_then`] / [`combine`]: accumulate failures, never short-circuit
//! - `for_*` adapters: bind a validator to one field with path tracking
//! - [`for_recursive`]: self-referential graphs with cycle and depth guards
//! - [`ValidationBuilder`]: fluent construction with conditional scopes
//!
//! ## Example
//!
//! ```rust,ignore
//! use validated_core::prelude::*;
//!
//! struct Person {
//!     name: String,
//!     address: Option<Address>,
//! }
//!
//! let validator = ValidationBuilder::<Person>::new()
//!     .for_member(member!(Person, name), not_blank())
//!     .for_optional_nested(member!(Person, address, optional), address_validator())
//!     .build()?;
//!
//! match validator.check(&person).await {
//!     Validated::Valid(_) => {}
//!     Validated::Invalid(failures) => {
//!         for failure in &failures {
//!             println!("{failure}");
//!         }
//!     }
//! }
//! ```

mod adapters;
mod builder;
mod combinators;
mod context;
mod entry;
mod member;
mod message;
mod recursive;
mod traits;
mod validated;


pub use adapters::{
    for_collection, for_comparison, for_each_entity, for_each_primitive, for_member, for_nested,
    for_optional_member, for_optional_nested,
};
pub use builder::{BuilderError, Condition, ValidationBuilder};
pub use combinators::{all_of, and_then, combine, AndThen, Combined};
pub use context::{
    Descent, ValidatedContext, ValidatedContextBuilder, ValidationOptions,
    DEFAULT_MAX_RECURSION_DEPTH,
};
pub use entry::{Cause, InvalidEntry};
pub use member::{index_path, join_path, Member, OptionalMember};
pub use message::{placeholders, MessageTemplate};
pub use recursive::{for_recursive, for_recursive_collection, RecursiveValidator};
pub use traits::{
    member_validator, EntityValidator, MemberValidator, PredicateValidator, SharedEntityValidator,
    SharedMemberValidator,
};
pub use validated::{
    combine2, combine3, combine4, Failures, Validated, ABSENT_VALUE_MESSAGE, NO_FAILURES_MESSAGE,
    UNKNOWN_FIELD,
};

// Implementors of the validator traits need these.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

/// Prelude module for validated-core
pub mod prelude {
    pub use crate::member;
    pub use crate::{
        and_then, combine, for_collection, for_comparison, for_each_entity, for_each_primitive,
        for_member, for_nested, for_optional_member, for_optional_nested, for_recursive,
        for_recursive_collection, member_validator, Cause, EntityValidator, InvalidEntry, Member,
        MemberValidator, OptionalMember, SharedEntityValidator, SharedMemberValidator, Validated,
        ValidatedContext, ValidationBuilder, ValidationOptions,
    };
    pub use async_trait::async_trait;
    pub use tokio_util::sync::CancellationToken;
}
