//! # Unit abstraction.
//!
//! A [`Unit`] is a lazily-activated feature module. It has a stable id, an
//! optional list of dependency ids, and an async initializer that receives the
//! [`Mediator`] and is expected to `subscribe` to the channel it serves.

use async_trait::async_trait;

use crate::core::Mediator;
use crate::error::UnitError;

/// # Lazily-loadable feature module.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use lazybus::{Context, Mediator, Unit, UnitError};
///
/// struct TodoList;
///
/// #[async_trait]
/// impl Unit for TodoList {
///     fn id(&self) -> &str { "widgets/todo_list/main" }
///
///     async fn init(&self, mediator: &Mediator) -> Result<(), UnitError> {
///         mediator.subscribe("todoList", Context::Unbound, |_inv| Ok(()));
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Unit: Send + Sync + 'static {
    /// Returns the unit identifier (`"widgets/todo_list/main"`).
    fn id(&self) -> &str;

    /// Identifiers that must be resolved before [`init`](Unit::init) runs.
    fn dependencies(&self) -> &[String] {
        &[]
    }

    /// Runs the unit's initialization code.
    ///
    /// Called again after the unit has been forgotten by the loader.
    async fn init(&self, mediator: &Mediator) -> Result<(), UnitError>;
}
