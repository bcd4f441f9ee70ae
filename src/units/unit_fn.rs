//! # Function-backed unit (`UnitFn`)
//!
//! [`UnitFn`] wraps a closure `F: Fn(Mediator) -> Fut`, producing a fresh
//! future per initialization. Re-running a forgotten unit calls the closure again.
//!
//! ## Example
//! ```rust
//! use lazybus::{Context, Mediator, UnitFn, UnitRef, UnitError};
//!
//! let unit: UnitRef = UnitFn::arc("widgets/todo_list/main", |m: Mediator| async move {
//!     m.subscribe("todoList", Context::Unbound, |_inv| Ok(()));
//!     Ok::<_, UnitError>(())
//! });
//!
//! assert_eq!(unit.id(), "widgets/todo_list/main");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Mediator;
use crate::error::UnitError;
use crate::units::unit::Unit;

/// Shared handle to a unit.
pub type UnitRef = Arc<dyn Unit>;

/// Function-backed unit implementation.
#[derive(Debug)]
pub struct UnitFn<F> {
    id: Cow<'static, str>,
    dependencies: Vec<String>,
    f: F,
}

impl<F> UnitFn<F> {
    /// Creates a new function-backed unit without dependencies.
    ///
    /// Prefer [`UnitFn::arc`] when you immediately need a [`UnitRef`].
    pub fn new(id: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
            f,
        }
    }

    /// Declares identifiers that must resolve before this unit initializes.
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Creates the unit and returns it as a shared handle.
    pub fn arc(id: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(id, f))
    }
}

#[async_trait]
impl<F, Fut> Unit for UnitFn<F>
where
    F: Fn(Mediator) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), UnitError>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn init(&self, mediator: &Mediator) -> Result<(), UnitError> {
        (self.f)(mediator.clone()).await
    }
}
