//! # Unit identifiers derived from channel names.
//!
//! A channel name such as `"todoList"` maps to the unit `"widgets/todo_list"`:
//! the name is decamelized and placed under a namespace. The mapping is total
//! and pure; two distinct channel names are not guaranteed to map to distinct units.
//!
//! ```text
//! "todoList" ──decamelize──► "todo_list" ──namespace──► "widgets/todo_list"
//!                                                        └─ entry ─► "widgets/todo_list/main"
//! ```

use std::fmt;
use std::sync::Arc;

/// Delimiter used by [`decamelize`] when none is configured.
pub const DEFAULT_DELIMITER: &str = "_";

/// Inserts `delimiter` before every internal upper-case letter, then lower-cases the result.
///
/// A leading upper-case letter gets no delimiter. Strings without upper-case
/// letters are returned unchanged.
///
/// # Example
/// ```
/// use lazybus::decamelize;
///
/// assert_eq!(decamelize("todoList", "_"), "todo_list");
/// assert_eq!(decamelize("todoList", "-"), "todo-list");
/// assert_eq!(decamelize("todo_list", "_"), "todo_list");
/// ```
pub fn decamelize(s: &str, delimiter: &str) -> String {
    let mut out = String::with_capacity(s.len() + delimiter.len() * 2);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push_str(delimiter);
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Typed unit identifier: a namespace plus a decamelized name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UnitId {
    namespace: Arc<str>,
    name: String,
}

impl UnitId {
    /// Builds a unit id directly from its parts.
    pub fn new(namespace: impl Into<Arc<str>>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Derives the unit id for a channel name.
    pub fn from_channel(channel: &str, namespace: &str, delimiter: &str) -> Self {
        Self::new(namespace, decamelize(channel, delimiter))
    }

    /// Namespace part (`"widgets"`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Decamelized name part (`"todo_list"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full unit path (`"widgets/todo_list"`); everything the unit owns lives under it.
    pub fn path(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    /// Identifier of the unit's entry module (`"widgets/todo_list/main"`).
    pub fn entry(&self, entry: &str) -> String {
        format!("{}/{}", self.path(), entry)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Selection rule used by the unload sweep.
///
/// Matches every identifier that **contains** the pattern anywhere, not only as
/// a path prefix: `"widgets/todo_list"` also selects `"widgets/todo_list_archive/main"`.
/// Units sharing a namespace path must therefore belong to the same feature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepPattern(String);

impl SweepPattern {
    /// Creates a pattern from a channel path or any other substring.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Returns `true` if `id` falls under this sweep.
    #[inline]
    pub fn matches(&self, id: &str) -> bool {
        id.contains(self.0.as_str())
    }

    /// The raw pattern.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&UnitId> for SweepPattern {
    fn from(id: &UnitId) -> Self {
        Self(id.path())
    }
}
