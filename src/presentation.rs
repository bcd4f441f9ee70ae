//! # Presentation boundary.
//!
//! The mediator does not render anything. When a channel is stopped it asks a
//! [`Presenter`] to detach the screen region the unit was drawn into,
//! identified by an opaque [`ElementRef`].

use std::fmt;
use std::sync::Arc;

use tracing::trace;

/// Opaque reference to a screen region (selector, node id, surface handle...).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementRef(Arc<str>);

impl ElementRef {
    /// Wraps a region reference.
    pub fn new(reference: impl Into<Arc<str>>) -> Self {
        Self(reference.into())
    }

    /// The raw reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ElementRef {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Presentation layer collaborator.
pub trait Presenter: Send + Sync + 'static {
    /// Removes the subtree rooted at `element`.
    fn detach(&self, element: &ElementRef);
}

/// Presenter for headless hosts: detaching only leaves a trace record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn detach(&self, element: &ElementRef) {
        trace!(element = %element, "detach (no presenter installed)");
    }
}
