//! Lift member validators into entity validators bound to one field.
//!
//! Every adapter reports an absent entity as a single `SystemError` failure,
//! builds `root-or-type.field` paths, and maps a valid member result back onto
//! the entity so adapters compose with [`combine`](crate::combine).

use crate::context::{Descent, ValidatedContext};
use crate::entry::{Cause, InvalidEntry};
use crate::member::{index_path, Member, OptionalMember};
use crate::traits::{EntityValidator, SharedEntityValidator, SharedMemberValidator};
use crate::validated::{Failures, Validated};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(crate) fn absent_entity<'a, E>(owner: &str, name: &str) -> Validated<&'a E> {
    debug!(owner, member = name, "entity instance was absent");
    Validated::invalid_entry(InvalidEntry::system_error(
        format!("{owner} instance was absent; {name} could not be validated."),
        owner,
        name,
    ))
}

pub(crate) fn required<'a, E>(path: &str, name: &str, display_name: &str) -> Validated<&'a E> {
    Validated::invalid_entry(InvalidEntry::new(
        format!("{display_name} is required"),
        path,
        name,
        display_name,
    ))
}

pub(crate) fn depth_exceeded(path: &str, name: &str, context: &ValidatedContext) -> InvalidEntry {
    warn!(
        path,
        max_depth = context.max_depth(),
        "maximum validation depth exceeded"
    );
    InvalidEntry::new(
        format!(
            "Maximum validation depth of {} exceeded.",
            context.max_depth()
        ),
        path,
        name,
        name,
    )
    .with_cause(Cause::SystemError)
}

/// Step into a nested entity, honouring the cycle guard and depth limit.
pub(crate) async fn descend_into<'a, N: Sync + 'static>(
    validator: &dyn EntityValidator<N>,
    nested: &'a N,
    path: &str,
    name: &str,
    context: &ValidatedContext,
    cancel: &CancellationToken,
) -> Validated<&'a N> {
    match context.descend(nested) {
        Descent::Cycle => Validated::valid(nested),
        Descent::DepthExceeded => Validated::invalid_entry(depth_exceeded(path, name, context)),
        Descent::Enter(child) => validator.validate(Some(nested), path, &child, cancel).await,
    }
}

/// Required member.
struct MemberAdapter<E, F: ?Sized> {
    member: Member<E, F>,
    validator: SharedMemberValidator<F>,
}

#[async_trait]
impl<E: Sync, F: ?Sized + Sync> EntityValidator<E> for MemberAdapter<E, F> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        _context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.member.owner(), self.member.name());
        };
        let path = self.member.full_path(root_path);
        self.validator
            .validate(self.member.get(entity), &path, None, cancel)
            .await
            .map(|_| entity)
    }
}

/// Optional member: absent means valid.
struct OptionalMemberAdapter<E, F: ?Sized> {
    member: OptionalMember<E, F>,
    validator: SharedMemberValidator<F>,
}

#[async_trait]
impl<E: Sync, F: ?Sized + Sync> EntityValidator<E> for OptionalMemberAdapter<E, F> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        _context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.member.owner(), self.member.name());
        };
        let Some(value) = self.member.get(entity) else {
            return Validated::valid(entity);
        };
        let path = self.member.full_path(root_path);
        self.validator
            .validate(value, &path, None, cancel)
            .await
            .map(|_| entity)
    }
}

/// Nested entity member.
struct NestedAdapter<E, N> {
    member: OptionalMember<E, N>,
    validator: SharedEntityValidator<N>,
    required: bool,
}

#[async_trait]
impl<E: Sync, N: Sync + 'static> EntityValidator<E> for NestedAdapter<E, N> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.member.owner(), self.member.name());
        };
        let path = self.member.full_path(root_path);
        let Some(nested) = self.member.get(entity) else {
            return if self.required {
                required(&path, self.member.name(), self.member.display_name())
            } else {
                Validated::valid(entity)
            };
        };
        descend_into(
            self.validator.as_ref(),
            nested,
            &path,
            self.member.name(),
            context,
            cancel,
        )
        .await
        .map(|_| entity)
    }
}

/// Every element of an entity collection.
struct EachEntityAdapter<E, N> {
    member: OptionalMember<E, [N]>,
    validator: SharedEntityValidator<N>,
}

#[async_trait]
impl<E: Sync, N: Sync + 'static> EntityValidator<E> for EachEntityAdapter<E, N> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.member.owner(), self.member.name());
        };
        let path = self.member.full_path(root_path);
        let Some(items) = self.member.get(entity) else {
            return required(&path, self.member.name(), self.member.display_name());
        };

        let mut failures = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_path = index_path(&path, index);
            let result = descend_into(
                self.validator.as_ref(),
                item,
                &item_path,
                self.member.name(),
                context,
                cancel,
            )
            .await;
            if let Validated::Invalid(item_failures) = result {
                failures.extend(item_failures);
            }
        }

        if failures.is_empty() {
            Validated::valid(entity)
        } else {
            Validated::Invalid(Failures::new(failures))
        }
    }
}

/// Every element of a primitive collection.
struct EachPrimitiveAdapter<E, T> {
    member: OptionalMember<E, [T]>,
    validator: SharedMemberValidator<T>,
}

#[async_trait]
impl<E: Sync, T: Sync> EntityValidator<E> for EachPrimitiveAdapter<E, T> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        _context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.member.owner(), self.member.name());
        };
        let path = self.member.full_path(root_path);
        let Some(items) = self.member.get(entity) else {
            return required(&path, self.member.name(), self.member.display_name());
        };

        let mut failures = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let item_path = index_path(&path, index);
            if let Validated::Invalid(item_failures) =
                self.validator.validate(item, &item_path, None, cancel).await
            {
                failures.extend(item_failures);
            }
        }

        if failures.is_empty() {
            Validated::valid(entity)
        } else {
            Validated::Invalid(Failures::new(failures))
        }
    }
}

/// The collection as a whole (count bounds and the like).
struct CollectionAdapter<E, T> {
    member: OptionalMember<E, [T]>,
    validator: SharedMemberValidator<[T]>,
}

#[async_trait]
impl<E: Sync, T: Sync> EntityValidator<E> for CollectionAdapter<E, T> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        _context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.member.owner(), self.member.name());
        };
        let path = self.member.full_path(root_path);
        let Some(items) = self.member.get(entity) else {
            return required(&path, self.member.name(), self.member.display_name());
        };
        self.validator
            .validate(items, &path, None, cancel)
            .await
            .map(|_| entity)
    }
}

/// Cross-field check: the whole entity goes to the validator, the member only
/// names the reporting path.
struct ComparisonAdapter<E> {
    owner: &'static str,
    name: &'static str,
    validator: SharedMemberValidator<E>,
}

#[async_trait]
impl<E: Sync> EntityValidator<E> for ComparisonAdapter<E> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        _context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(entity) = entity else {
            return absent_entity(self.owner, self.name);
        };
        let path = crate::member::join_path(root_path, self.owner, self.name);
        self.validator.validate(entity, &path, None, cancel).await
    }
}

/// Validate a required member.
pub fn for_member<E, F>(
    member: Member<E, F>,
    validator: SharedMemberValidator<F>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    F: ?Sized + Sync + 'static,
{
    Arc::new(MemberAdapter { member, validator })
}

/// Validate an optional member; absent values are valid and skip the validator.
pub fn for_optional_member<E, F>(
    member: OptionalMember<E, F>,
    validator: SharedMemberValidator<F>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    F: ?Sized + Sync + 'static,
{
    Arc::new(OptionalMemberAdapter { member, validator })
}

/// Validate a nested entity that must be present.
pub fn for_nested<E, N>(
    member: OptionalMember<E, N>,
    validator: SharedEntityValidator<N>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    N: Sync + 'static,
{
    Arc::new(NestedAdapter {
        member,
        validator,
        required: true,
    })
}

/// Validate a nested entity that may be absent.
pub fn for_optional_nested<E, N>(
    member: OptionalMember<E, N>,
    validator: SharedEntityValidator<N>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    N: Sync + 'static,
{
    Arc::new(NestedAdapter {
        member,
        validator,
        required: false,
    })
}

/// Validate every entity in a collection at `path[index]`.
pub fn for_each_entity<E, N>(
    member: OptionalMember<E, [N]>,
    validator: SharedEntityValidator<N>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    N: Sync + 'static,
{
    Arc::new(EachEntityAdapter { member, validator })
}

/// Validate every primitive in a collection at `path[index]`.
pub fn for_each_primitive<E, T>(
    member: OptionalMember<E, [T]>,
    validator: SharedMemberValidator<T>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    T: Sync + 'static,
{
    Arc::new(EachPrimitiveAdapter { member, validator })
}

/// Validate a collection as a whole.
pub fn for_collection<E, T>(
    member: OptionalMember<E, [T]>,
    validator: SharedMemberValidator<[T]>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    T: Sync + 'static,
{
    Arc::new(CollectionAdapter { member, validator })
}

/// Validate the whole entity with a comparison validator reported under `member`.
pub fn for_comparison<E, F>(
    member: Member<E, F>,
    validator: SharedMemberValidator<E>,
) -> SharedEntityValidator<E>
where
    E: Sync + 'static,
    F: ?Sized,
{
    Arc::new(ComparisonAdapter {
        owner: member.owner(),
        name: member.name(),
        validator,
    })
}
