//! Validator contracts.

use crate::context::ValidatedContext;
use crate::entry::InvalidEntry;
use crate::message::{placeholders, MessageTemplate};
use crate::validated::Validated;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Checks a single value.
///
/// An empty `path` means "report under the validator's own property name".
///
/// ## Example
///
/// ```rust,ignore
/// use validated_core::prelude::*;
///
/// struct NotBlank;
///
/// #[async_trait]
/// impl MemberValidator<String> for NotBlank {
///     async fn validate<'a>(
///         &self,
///         value: &'a String,
///         path: &str,
///         _compare_to: Option<&'a String>,
///         _cancel: &CancellationToken,
///     ) -> Validated<&'a String> {
///         if value.trim().is_empty() {
///             Validated::invalid_entry(InvalidEntry::new("Must not be blank", path, "name", "Name"))
///         } else {
///             Validated::valid(value)
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait MemberValidator<T: ?Sized + Sync>: Send + Sync {
    async fn validate<'a>(
        &self,
        value: &'a T,
        path: &str,
        compare_to: Option<&'a T>,
        cancel: &CancellationToken,
    ) -> Validated<&'a T>;

    /// Validate with the default path, no comparison value and a fresh token.
    async fn check<'a>(&self, value: &'a T) -> Validated<&'a T> {
        let cancel = CancellationToken::new();
        self.validate(value, "", None, &cancel).await
    }
}

/// Checks a whole entity and, transitively, its members.
///
/// `entity` is `None` when the instance is absent; implementations report
/// that as a failure instead of panicking. An empty `root_path` means "use the
/// type name".
#[async_trait]
pub trait EntityValidator<E: Sync>: Send + Sync {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E>;

    /// Validate a root entity with a fresh context and token.
    async fn check<'a>(&self, entity: &'a E) -> Validated<&'a E> {
        let context = ValidatedContext::new();
        let cancel = CancellationToken::new();
        self.validate(Some(entity), "", &context, &cancel).await
    }
}

pub type SharedMemberValidator<T> = Arc<dyn MemberValidator<T>>;
pub type SharedEntityValidator<E> = Arc<dyn EntityValidator<E>>;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Member validator backed by a synchronous predicate.
pub struct PredicateValidator<T: ?Sized> {
    predicate: Predicate<T>,
    property_name: String,
    display_name: String,
    failure_message: String,
}

impl<T: ?Sized> PredicateValidator<T> {
    pub fn new(
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
        property_name: impl Into<String>,
        display_name: impl Into<String>,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            property_name: property_name.into(),
            display_name: display_name.into(),
            failure_message: failure_message.into(),
        }
    }

    fn failure(&self, path: &str) -> InvalidEntry {
        let path = if path.is_empty() {
            self.property_name.as_str()
        } else {
            path
        };
        let message = MessageTemplate::new(&self.failure_message)
            .param(placeholders::PROPERTY_NAME, &self.property_name)
            .param(placeholders::DISPLAY_NAME, &self.display_name)
            .render();
        InvalidEntry::new(message, path, &self.property_name, &self.display_name)
    }
}

#[async_trait]
impl<T: ?Sized + Sync> MemberValidator<T> for PredicateValidator<T> {
    async fn validate<'a>(
        &self,
        value: &'a T,
        path: &str,
        _compare_to: Option<&'a T>,
        _cancel: &CancellationToken,
    ) -> Validated<&'a T> {
        if (self.predicate)(value) {
            Validated::valid(value)
        } else {
            Validated::invalid_entry(self.failure(path))
        }
    }
}

/// Build a shared member validator from a predicate.
///
/// `{PropertyName}` and `{DisplayName}` in `failure_message` are substituted.
pub fn member_validator<T: ?Sized + Sync + 'static>(
    predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    property_name: impl Into<String>,
    display_name: impl Into<String>,
    failure_message: impl Into<String>,
) -> SharedMemberValidator<T> {
    Arc::new(PredicateValidator::new(
        predicate,
        property_name,
        display_name,
        failure_message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn predicate_pass_returns_the_value() {
        let validator = member_validator(|v: &i32| *v > 0, "age", "Age", "{DisplayName} must be positive");
        let value = 5;
        assert_eq!(validator.check(&value).await, Validated::Valid(&5));
    }

    #[tokio::test]
    async fn empty_path_falls_back_to_property_name() {
        let validator = member_validator(|v: &str| !v.is_empty(), "name", "Name", "{DisplayName} is required");
        let result = validator.check("").await;
        let failure = &result.failures()[0];
        assert_eq!(failure.path, "name");
        assert_eq!(failure.failure_message, "Name is required");
    }

    #[tokio::test]
    async fn explicit_path_is_kept() {
        let validator = member_validator(|v: &str| !v.is_empty(), "name", "Name", "required");
        let cancel = CancellationToken::new();
        let result = validator.validate("", "Person.name", None, &cancel).await;
        assert_eq!(result.failures()[0].path, "Person.name");
    }
}
