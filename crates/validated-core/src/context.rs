//! Recursion bookkeeping threaded through nested validation.

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

/// Default limit for nested and recursive descent.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 100;

/// Engine configuration carried on every context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Descent stops with a `SystemError` once this depth is reached.
    pub max_recursion_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

/// Outcome of trying to step into a nested instance.
#[derive(Debug, Clone)]
pub enum Descent {
    /// Continue with this forked context.
    Enter(ValidatedContext),
    /// The instance is already being validated further up the stack.
    Cycle,
    /// Stepping in would reach the configured depth limit.
    DepthExceeded,
}

/// Immutable recursion ledger.
///
/// Every fork returns a new context; the set of in-flight instances is shared
/// copy-on-write, so two concurrent runs of the same validator never see each
/// other's bookkeeping.
///
/// ## Example
///
/// ```rust
/// use validated_core::ValidatedContext;
///
/// let root = ValidatedContext::builder().max_recursion_depth(5).build();
/// let child = root.with_incremented_depth();
///
/// assert_eq!(root.depth(), 0);
/// assert_eq!(child.depth(), 1);
/// assert_eq!(child.max_depth(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidatedContext {
    depth: usize,
    options: ValidationOptions,
    validating: Arc<HashSet<Identity>>,
}

impl ValidatedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh context using the given options.
    pub fn with_options(options: ValidationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn builder() -> ValidatedContextBuilder {
        ValidatedContextBuilder::new()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.options.max_recursion_depth
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Number of instances currently in flight.
    pub fn validating_count(&self) -> usize {
        self.validating.len()
    }

    pub fn with_incremented_depth(&self) -> Self {
        Self {
            depth: self.depth + 1,
            options: self.options,
            validating: Arc::clone(&self.validating),
        }
    }

    /// Record `instance` as in flight.
    pub fn with_validating<T: ?Sized + 'static>(&self, instance: &T) -> Self {
        let mut validating = (*self.validating).clone();
        validating.insert(identity(instance));
        Self {
            depth: self.depth,
            options: self.options,
            validating: Arc::new(validating),
        }
    }

    /// Identity check; structurally equal but distinct instances are not matched.
    pub fn is_validating<T: ?Sized + 'static>(&self, instance: &T) -> bool {
        self.validating.contains(&identity(instance))
    }

    /// Decide whether validation may step into `instance`.
    pub fn descend<T: ?Sized + 'static>(&self, instance: &T) -> Descent {
        if self.is_validating(instance) {
            return Descent::Cycle;
        }
        let next = self.with_incremented_depth();
        if next.depth >= next.max_depth() {
            return Descent::DepthExceeded;
        }
        Descent::Enter(next.with_validating(instance))
    }
}

/// Address plus type: a struct and its first inline field share an address.
type Identity = (usize, TypeId);

fn identity<T: ?Sized + 'static>(instance: &T) -> Identity {
    ((instance as *const T).cast::<()>() as usize, TypeId::of::<T>())
}

/// Builder for a top-level [`ValidatedContext`].
#[derive(Debug, Default)]
pub struct ValidatedContextBuilder {
    options: ValidationOptions,
}

impl ValidatedContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.options.max_recursion_depth = depth;
        self
    }

    pub fn build(self) -> ValidatedContext {
        ValidatedContext::with_options(self.options)
    }
}
