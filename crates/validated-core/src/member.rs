//! Compile-time member accessors.
//!
//! A member pairs a stable field name with a plain projection function. The
//! [`member!`](crate::member) macro generates both from the field itself, so
//! names never drift from the struct definition.

use std::fmt;

/// Accessor for a member that is always present.
pub struct Member<E, F: ?Sized> {
    owner: &'static str,
    name: &'static str,
    display_name: &'static str,
    get: fn(&E) -> &F,
}

/// Accessor for a member that may be absent (an `Option`, or a collection
/// exposed as a slice).
pub struct OptionalMember<E, F: ?Sized> {
    owner: &'static str,
    name: &'static str,
    display_name: &'static str,
    get: fn(&E) -> Option<&F>,
}

impl<E, F: ?Sized> Member<E, F> {
    pub fn new(owner: &'static str, name: &'static str, get: fn(&E) -> &F) -> Self {
        Self {
            owner,
            name,
            display_name: name,
            get,
        }
    }

    pub fn with_display_name(mut self, display_name: &'static str) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn get<'a>(&self, entity: &'a E) -> &'a F {
        (self.get)(entity)
    }

    pub fn full_path(&self, root_path: &str) -> String {
        join_path(root_path, self.owner, self.name)
    }
}

impl<E, F: ?Sized> OptionalMember<E, F> {
    pub fn new(owner: &'static str, name: &'static str, get: fn(&E) -> Option<&F>) -> Self {
        Self {
            owner,
            name,
            display_name: name,
            get,
        }
    }

    pub fn with_display_name(mut self, display_name: &'static str) -> Self {
        self.display_name = display_name;
        self
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn get<'a>(&self, entity: &'a E) -> Option<&'a F> {
        (self.get)(entity)
    }

    pub fn full_path(&self, root_path: &str) -> String {
        join_path(root_path, self.owner, self.name)
    }
}

// Manual impls: derives would demand `E: Clone` and `F: Clone`.
impl<E, F: ?Sized> Clone for Member<E, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, F: ?Sized> Copy for Member<E, F> {}

impl<E, F: ?Sized> Clone for OptionalMember<E, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, F: ?Sized> Copy for OptionalMember<E, F> {}

impl<E, F: ?Sized> fmt::Debug for Member<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .finish()
    }
}

impl<E, F: ?Sized> fmt::Debug for OptionalMember<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalMember")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .finish()
    }
}

/// `root_path.name`, or `owner.name` when no root path was given.
pub fn join_path(root_path: &str, owner: &str, name: &str) -> String {
    let root = if root_path.is_empty() { owner } else { root_path };
    format!("{root}.{name}")
}

/// `path[index]`.
pub fn index_path(path: &str, index: usize) -> String {
    format!("{path}[{index}]")
}

/// Generate a [`Member`] or [`OptionalMember`] for a struct field.
///
/// - `member!(Person, name)`: required field, `&e.name`
/// - `member!(Person, nickname, optional)`: `Option<T>` field, `e.nickname.as_ref()`
/// - `member!(Node, child, deref)`: `Option<Box<T>>`/`Option<String>`/`Option<Vec<T>>`, `e.child.as_deref()`
/// - `member!(Person, tags, slice)`: `Vec<T>` field exposed as `[T]`
///
/// ```rust
/// use validated_core::member;
///
/// struct Person {
///     name: String,
///     nickname: Option<String>,
///     tags: Vec<String>,
/// }
///
/// let name = member!(Person, name);
/// let nickname = member!(Person, nickname, deref);
/// let tags = member!(Person, tags, slice);
///
/// let person = Person { name: "Ada".into(), nickname: None, tags: vec!["x".into()] };
/// assert_eq!(name.get(&person), "Ada");
/// assert_eq!(nickname.get(&person), None);
/// assert_eq!(tags.get(&person).map(|t| t.len()), Some(1));
/// assert_eq!(name.full_path(""), "Person.name");
/// ```
#[macro_export]
macro_rules! member {
    ($owner:ident, $field:ident) => {
        $crate::Member::new(stringify!($owner), stringify!($field), |e: &$owner| &e.$field)
    };
    ($owner:ident, $field:ident, optional) => {
        $crate::OptionalMember::new(stringify!($owner), stringify!($field), |e: &$owner| {
            e.$field.as_ref()
        })
    };
    ($owner:ident, $field:ident, deref) => {
        $crate::OptionalMember::new(stringify!($owner), stringify!($field), |e: &$owner| {
            e.$field.as_deref()
        })
    };
    ($owner:ident, $field:ident, slice) => {
        $crate::OptionalMember::new(stringify!($owner), stringify!($field), |e: &$owner| {
            Some(e.$field.as_slice())
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order {
        id: u32,
        note: Option<String>,
        lines: Vec<u32>,
    }

    #[test]
    fn paths_prefer_root_over_owner() {
        let id = member!(Order, id);
        assert_eq!(id.full_path(""), "Order.id");
        assert_eq!(id.full_path("Customer.orders[2]"), "Customer.orders[2].id");
        assert_eq!(index_path("Order.lines", 3), "Order.lines[3]");
    }

    #[test]
    fn accessors_project_fields() {
        let order = Order {
            id: 9,
            note: Some("rush".into()),
            lines: vec![1, 2],
        };
        assert_eq!(*member!(Order, id).get(&order), 9);
        assert_eq!(member!(Order, note, optional).get(&order), Some(&"rush".to_string()));
        assert_eq!(member!(Order, lines, slice).get(&order), Some(&[1, 2][..]));
    }

    #[test]
    fn display_name_defaults_to_name() {
        let note = member!(Order, note, deref);
        assert_eq!(note.display_name(), "note");
        assert_eq!(note.with_display_name("Delivery note").display_name(), "Delivery note");
    }
}
