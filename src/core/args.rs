//! Publish arguments.

use std::ops::Index;
use std::slice;
use std::sync::Arc;

use serde_json::Value;

/// Immutable argument list forwarded to every callback of a dispatch.
///
/// Cloning is cheap: the values are shared, so a cold start can hold on to the
/// original arguments until the unit has been resolved.
///
/// # Example
/// ```
/// use lazybus::Args;
/// use serde_json::json;
///
/// let args = Args::from(vec![json!("buy milk"), json!(3)]);
/// assert_eq!(args.len(), 2);
/// assert_eq!(args[0], json!("buy milk"));
/// assert!(Args::from(()).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Args(Arc<[Value]>);

impl Args {
    /// An empty argument list.
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Argument at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the arguments in order.
    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// All arguments as a slice.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl Default for Args {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(Arc::from(values))
    }
}

impl From<Value> for Args {
    fn from(value: Value) -> Self {
        Self(Arc::from(vec![value]))
    }
}

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Self::empty()
    }
}

impl Index<usize> for Args {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
