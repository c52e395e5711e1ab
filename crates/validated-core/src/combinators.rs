//! Sequential, accumulating composition of validators.
//!
//! Nothing here short-circuits: every constituent runs, in declaration order,
//! one at a time, and all failures are reported.

use crate::context::ValidatedContext;
use crate::traits::{EntityValidator, MemberValidator, SharedEntityValidator, SharedMemberValidator};
use crate::validated::{Failures, Validated};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs both member validators on the same value.
pub struct AndThen<T: ?Sized> {
    first: SharedMemberValidator<T>,
    second: SharedMemberValidator<T>,
}

#[async_trait]
impl<T: ?Sized + Sync> MemberValidator<T> for AndThen<T> {
    async fn validate<'a>(
        &self,
        value: &'a T,
        path: &str,
        compare_to: Option<&'a T>,
        cancel: &CancellationToken,
    ) -> Validated<&'a T> {
        let first = self.first.validate(value, path, compare_to, cancel).await;
        let second = self.second.validate(value, path, compare_to, cancel).await;
        first.accumulate(second)
    }
}

/// Compose two member validators; succeeds only if both succeed, failures of
/// `first` come first.
pub fn and_then<T: ?Sized + Sync + 'static>(
    first: SharedMemberValidator<T>,
    second: SharedMemberValidator<T>,
) -> SharedMemberValidator<T> {
    Arc::new(AndThen { first, second })
}

/// Fold any number of member validators with [`and_then`].
///
/// Returns `None` for an empty input.
pub fn all_of<T: ?Sized + Sync + 'static>(
    validators: impl IntoIterator<Item = SharedMemberValidator<T>>,
) -> Option<SharedMemberValidator<T>> {
    validators
        .into_iter()
        .reduce(|first, second| and_then(first, second))
}

/// Runs every entity validator against the same entity.
pub struct Combined<E> {
    validators: Vec<SharedEntityValidator<E>>,
}

#[async_trait]
impl<E: Sync> EntityValidator<E> for Combined<E> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let mut failures = Vec::new();
        for validator in &self.validators {
            if let Validated::Invalid(found) =
                validator.validate(entity, root_path, context, cancel).await
            {
                failures.extend(found);
            }
        }

        if !failures.is_empty() {
            return Validated::Invalid(Failures::new(failures));
        }
        // Adapters report an absent entity themselves; this covers an empty list.
        Validated::valid_option(entity)
    }
}

/// Combine entity validators into one that reports every failure in order.
pub fn combine<E: Sync + 'static>(
    validators: impl IntoIterator<Item = SharedEntityValidator<E>>,
) -> SharedEntityValidator<E> {
    Arc::new(Combined {
        validators: validators.into_iter().collect(),
    })
}
