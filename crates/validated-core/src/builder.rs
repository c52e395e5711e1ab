//! Fluent construction of entity validators.

use crate::adapters;
use crate::combinators::combine;
use crate::context::ValidatedContext;
use crate::member::{Member, OptionalMember};
use crate::recursive;
use crate::traits::{EntityValidator, SharedEntityValidator, SharedMemberValidator};
use crate::validated::Validated;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors detected while building a validator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    #[error("{0} conditional scope(s) opened with `when` were never closed with `end_when`")]
    UnclosedScopes(usize),

    #[error("`end_when` called without a matching `when`")]
    UnbalancedEndWhen,
}

/// Condition evaluated against the entity before a scoped validator runs.
pub type Condition<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Runs `inner` only when every condition holds; otherwise the entity is valid.
struct Conditional<E> {
    conditions: Vec<Condition<E>>,
    inner: SharedEntityValidator<E>,
}

#[async_trait]
impl<E: Sync> EntityValidator<E> for Conditional<E> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        match entity {
            Some(e) if !self.conditions.iter().all(|condition| condition(e)) => {
                Validated::valid(e)
            }
            _ => self.inner.validate(entity, root_path, context, cancel).await,
        }
    }
}

/// Fluent builder over the entity-member adapters.
///
/// `when`/`end_when` push and pop conditions; every validator added while
/// scopes are open runs only if all open conditions hold. Unbalanced scopes
/// fail [`build`](Self::build), never validation.
///
/// ## Example
///
/// ```rust,ignore
/// let validator = ValidationBuilder::<Order>::new()
///     .for_member(member!(Order, reference), not_blank())
///     .when(|o: &Order| o.express)
///         .for_optional_member(member!(Order, phone, deref), phone_format())
///     .end_when()
///     .build()?;
/// ```
pub struct ValidationBuilder<E> {
    validators: Vec<SharedEntityValidator<E>>,
    scopes: Vec<Condition<E>>,
    error: Option<BuilderError>,
}

impl<E> Default for ValidationBuilder<E> {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
            scopes: Vec::new(),
            error: None,
        }
    }
}

impl<E: Sync + 'static> ValidationBuilder<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary entity validator under the current scopes.
    pub fn validator(mut self, validator: SharedEntityValidator<E>) -> Self {
        let validator = if self.scopes.is_empty() {
            validator
        } else {
            Arc::new(Conditional {
                conditions: self.scopes.clone(),
                inner: validator,
            })
        };
        self.validators.push(validator);
        self
    }

    pub fn for_member<F>(self, member: Member<E, F>, validator: SharedMemberValidator<F>) -> Self
    where
        F: ?Sized + Sync + 'static,
    {
        self.validator(adapters::for_member(member, validator))
    }

    pub fn for_optional_member<F>(
        self,
        member: OptionalMember<E, F>,
        validator: SharedMemberValidator<F>,
    ) -> Self
    where
        F: ?Sized + Sync + 'static,
    {
        self.validator(adapters::for_optional_member(member, validator))
    }

    pub fn for_nested<N: Sync + 'static>(
        self,
        member: OptionalMember<E, N>,
        validator: SharedEntityValidator<N>,
    ) -> Self {
        self.validator(adapters::for_nested(member, validator))
    }

    pub fn for_optional_nested<N: Sync + 'static>(
        self,
        member: OptionalMember<E, N>,
        validator: SharedEntityValidator<N>,
    ) -> Self {
        self.validator(adapters::for_optional_nested(member, validator))
    }

    pub fn for_each_entity<N: Sync + 'static>(
        self,
        member: OptionalMember<E, [N]>,
        validator: SharedEntityValidator<N>,
    ) -> Self {
        self.validator(adapters::for_each_entity(member, validator))
    }

    pub fn for_each_primitive<T: Sync + 'static>(
        self,
        member: OptionalMember<E, [T]>,
        validator: SharedMemberValidator<T>,
    ) -> Self {
        self.validator(adapters::for_each_primitive(member, validator))
    }

    pub fn for_collection<T: Sync + 'static>(
        self,
        member: OptionalMember<E, [T]>,
        validator: SharedMemberValidator<[T]>,
    ) -> Self {
        self.validator(adapters::for_collection(member, validator))
    }

    pub fn for_comparison<F: ?Sized>(
        self,
        member: Member<E, F>,
        validator: SharedMemberValidator<E>,
    ) -> Self {
        self.validator(adapters::for_comparison(member, validator))
    }

    /// Validate the entity recursively through `child`, with everything added
    /// so far as the per-node validator.
    pub fn for_recursive(mut self, child: OptionalMember<E, E>) -> Self {
        let node = combine(std::mem::take(&mut self.validators));
        self.validator(recursive::for_recursive(node, child))
    }

    /// Collection variant of [`for_recursive`](Self::for_recursive).
    pub fn for_recursive_collection(mut self, children: OptionalMember<E, [E]>) -> Self {
        let node = combine(std::mem::take(&mut self.validators));
        self.validator(recursive::for_recursive_collection(node, children))
    }

    /// Open a conditional scope.
    pub fn when(mut self, condition: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        self.scopes.push(Arc::new(condition));
        self
    }

    /// Close the innermost conditional scope.
    pub fn end_when(mut self) -> Self {
        if self.scopes.pop().is_none() && self.error.is_none() {
            self.error = Some(BuilderError::UnbalancedEndWhen);
        }
        self
    }

    /// Number of scopes currently open.
    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    pub fn build(self) -> Result<SharedEntityValidator<E>, BuilderError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.scopes.is_empty() {
            return Err(BuilderError::UnclosedScopes(self.scopes.len()));
        }
        debug!(validators = self.validators.len(), "entity validator built");
        Ok(combine(self.validators))
    }
}
