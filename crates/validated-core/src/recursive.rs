//! Validation of self-referential structures.
//!
//! Each node runs the per-node validator, then descends into its children.
//! Descent stops quietly on an instance that is already in flight (a reference
//! cycle) and stops with a `SystemError` once the context depth reaches the
//! configured maximum.

use crate::adapters::{absent_entity, descend_into};
use crate::context::ValidatedContext;
use crate::member::{index_path, OptionalMember};
use crate::traits::{EntityValidator, SharedEntityValidator};
use crate::validated::Validated;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

enum Children<E> {
    Single(OptionalMember<E, E>),
    Many(OptionalMember<E, [E]>),
}

impl<E> Children<E> {
    fn owner(&self) -> &'static str {
        match self {
            Children::Single(member) => member.owner(),
            Children::Many(member) => member.owner(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Children::Single(member) => member.name(),
            Children::Many(member) => member.name(),
        }
    }
}

/// Self-referential entity validator.
pub struct RecursiveValidator<E> {
    node: SharedEntityValidator<E>,
    children: Children<E>,
}

#[async_trait]
impl<E: Sync + 'static> EntityValidator<E> for RecursiveValidator<E> {
    async fn validate<'a>(
        &self,
        entity: Option<&'a E>,
        root_path: &str,
        context: &ValidatedContext,
        cancel: &CancellationToken,
    ) -> Validated<&'a E> {
        let Some(node) = entity else {
            return absent_entity(self.children.owner(), self.children.name());
        };
        let path = if root_path.is_empty() {
            self.children.owner().to_string()
        } else {
            root_path.to_string()
        };
        // Entered through `descend` the node is already recorded; a root is not.
        let context = if context.is_validating(node) {
            context.clone()
        } else {
            context.with_validating(node)
        };

        let mut outcome = self
            .node
            .validate(Some(node), &path, &context, cancel)
            .await;

        match &self.children {
            Children::Single(member) => {
                if let Some(child) = member.get(node) {
                    let child_path = member.full_path(&path);
                    let child_result =
                        descend_into(self, child, &child_path, member.name(), &context, cancel)
                            .await;
                    outcome = outcome.accumulate(child_result);
                }
            }
            Children::Many(member) => {
                if let Some(children) = member.get(node) {
                    let children_path = member.full_path(&path);
                    for (index, child) in children.iter().enumerate() {
                        let child_path = index_path(&children_path, index);
                        let child_result = descend_into(
                            self,
                            child,
                            &child_path,
                            member.name(),
                            &context,
                            cancel,
                        )
                        .await;
                        outcome = outcome.accumulate(child_result);
                    }
                }
            }
        }

        outcome
    }
}

/// Validate a node and, recursively, its optional child of the same type.
///
/// ```rust,ignore
/// struct Category {
///     name: String,
///     parent: Option<Box<Category>>,
/// }
///
/// let node = for_member(member!(Category, name), not_blank());
/// let validator = for_recursive(node, member!(Category, parent, deref));
/// ```
pub fn for_recursive<E: Sync + 'static>(
    node: SharedEntityValidator<E>,
    child: OptionalMember<E, E>,
) -> SharedEntityValidator<E> {
    Arc::new(RecursiveValidator {
        node,
        children: Children::Single(child),
    })
}

/// Validate a node and, recursively, every child in a collection of the same type.
pub fn for_recursive_collection<E: Sync + 'static>(
    node: SharedEntityValidator<E>,
    children: OptionalMember<E, [E]>,
) -> SharedEntityValidator<E> {
    Arc::new(RecursiveValidator {
        node,
        children: Children::Many(children),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::for_member;
    use crate::entry::Cause;
    use crate::member;
    use crate::traits::member_validator;
    use std::sync::{Arc as StdArc, OnceLock};

    struct Node {
        value: i32,
        child: Option<Box<Node>>,
    }

    fn chain(length: usize) -> Node {
        let mut node = Node {
            value: -1,
            child: None,
        };
        for _ in 1..length {
            node = Node {
                value: -1,
                child: Some(Box::new(node)),
            };
        }
        node
    }

    fn positive_value() -> SharedEntityValidator<Node> {
        for_member(
            member!(Node, value),
            member_validator(|v: &i32| *v > 0, "value", "Value", "{DisplayName} must be positive"),
        )
    }

    #[tokio::test]
    async fn chain_is_cut_at_max_depth() {
        let root = chain(10);
        let validator = for_recursive(positive_value(), member!(Node, child, deref));
        let context = ValidatedContext::builder().max_recursion_depth(5).build();
        let cancel = CancellationToken::new();

        let result = validator.validate(Some(&root), "", &context, &cancel).await;
        let failures = result.failures();

        assert_eq!(failures.len(), 6);
        let node_failures = failures.iter().filter(|e| e.cause == Cause::Validation).count();
        assert_eq!(node_failures, 5);
        let depth = failures.iter().find(|e| e.cause == Cause::SystemError).unwrap();
        assert_eq!(depth.path, "Node.child.child.child.child.child");
        assert!(depth.failure_message.contains("Maximum validation depth"));
    }

    #[tokio::test]
    async fn short_chain_reports_each_node() {
        let root = chain(3);
        let validator = for_recursive(positive_value(), member!(Node, child, deref));
        let result = validator.check(&root).await;
        let paths: Vec<_> = result.failures().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            ["Node.value", "Node.child.value", "Node.child.child.value"]
        );
    }

    #[tokio::test]
    async fn valid_chain_is_valid() {
        let root = Node {
            value: 1,
            child: Some(Box::new(Node {
                value: 2,
                child: None,
            })),
        };
        let validator = for_recursive(positive_value(), member!(Node, child, deref));
        assert!(validator.check(&root).await.is_valid());
    }

    // Cycles need shared ownership; the graph is built with `Arc` and `OnceLock`.
    struct Person {
        name: String,
        friend: OnceLock<StdArc<Person>>,
    }

    #[tokio::test]
    async fn cycle_terminates_without_extra_failures() {
        let a = StdArc::new(Person {
            name: String::new(),
            friend: OnceLock::new(),
        });
        let b = StdArc::new(Person {
            name: String::new(),
            friend: OnceLock::from(StdArc::clone(&a)),
        });
        assert!(a.friend.set(StdArc::clone(&b)).is_ok());

        let node = for_member(
            member!(Person, name),
            member_validator(|n: &String| !n.is_empty(), "name", "Name", "{DisplayName} is required"),
        );
        let friend = OptionalMember::new("Person", "friend", |p: &Person| {
            p.friend.get().map(|f| &**f)
        });
        let validator = for_recursive(node, friend);
        let result = validator.check(a.as_ref()).await;
        let paths: Vec<_> = result.failures().iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths, ["Person.name", "Person.friend.name"]);
    }

    struct Tree {
        label: &'static str,
        children: Vec<Tree>,
    }

    #[tokio::test]
    async fn collection_children_are_indexed() {
        let tree = Tree {
            label: "root",
            children: vec![
                Tree {
                    label: "",
                    children: Vec::new(),
                },
                Tree {
                    label: "leaf",
                    children: vec![Tree {
                        label: "",
                        children: Vec::new(),
                    }],
                },
            ],
        };
        let node = for_member(
            member!(Tree, label),
            member_validator(|l: &&'static str| !l.is_empty(), "label", "Label", "empty"),
        );
        let validator = for_recursive_collection(node, member!(Tree, children, slice));
        let result = validator.check(&tree).await;
        let paths: Vec<_> = result.failures().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            ["Tree.children[0].label", "Tree.children[1].children[0].label"]
        );
    }

    /// Yields before judging, so concurrent runs interleave.
    struct YieldingPositive;

    #[async_trait]
    impl crate::traits::MemberValidator<i32> for YieldingPositive {
        async fn validate<'a>(
            &self,
            value: &'a i32,
            path: &str,
            _compare_to: Option<&'a i32>,
            _cancel: &CancellationToken,
        ) -> Validated<&'a i32> {
            tokio::task::yield_now().await;
            if *value > 0 {
                Validated::valid(value)
            } else {
                Validated::invalid_entry(crate::entry::InvalidEntry::new("not positive", path, "value", "Value"))
            }
        }
    }

    #[tokio::test]
    async fn concurrent_runs_keep_separate_bookkeeping() {
        let short = chain(3);
        let long = chain(7);
        let node = for_member(member!(Node, value), StdArc::new(YieldingPositive));
        let validator = for_recursive(node, member!(Node, child, deref));
        let context = ValidatedContext::builder().max_recursion_depth(5).build();
        let cancel = CancellationToken::new();

        let (short_result, long_result) = tokio::join!(
            validator.validate(Some(&short), "", &context, &cancel),
            validator.validate(Some(&long), "", &context, &cancel),
        );

        assert_eq!(short_result.failures().len(), 3);
        assert!(short_result.failures().iter().all(|e| e.cause == Cause::Validation));

        let long_failures = long_result.failures();
        assert_eq!(long_failures.len(), 6);
        assert_eq!(
            long_failures.iter().filter(|e| e.cause == Cause::SystemError).count(),
            1
        );
        assert_eq!(context.validating_count(), 0);
        assert_eq!(context.depth(), 0);
    }
}
