//! # Callback bindings.
//!
//! A [`Binding`] pairs a callback with the [`Context`] it runs in. Bindings are
//! immutable: re-binding a callback means subscribing again, which appends a
//! new binding to the channel.
//!
//! ## Context on the two dispatch paths
//! ```text
//! publish (warm)  ──► callback(Invocation { context: binding.context })
//! start   (cold)  ──► callback(Invocation { context: Context::Mediator(..) })
//! ```
//! The cold path ignores the binding's own context.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::core::Mediator;
use crate::core::args::Args;
use crate::error::SubscriberError;

/// Shared callback type stored in a binding.
pub type Callback = Arc<dyn Fn(&Invocation<'_>) -> Result<(), SubscriberError> + Send + Sync>;

/// Execution context a callback is invoked with.
#[derive(Clone, Default)]
pub enum Context {
    /// No context.
    #[default]
    Unbound,
    /// Caller-supplied value.
    Value(Arc<dyn Any + Send + Sync>),
    /// The mediator itself (cold-start dispatch).
    Mediator(Mediator),
}

impl Context {
    /// Wraps a caller-supplied value.
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Context::Value(Arc::new(value))
    }

    /// Borrows the caller-supplied value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Context::Value(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The mediator, when dispatched from a cold start.
    pub fn as_mediator(&self) -> Option<&Mediator> {
        match self {
            Context::Mediator(m) => Some(m),
            _ => None,
        }
    }

    /// Returns `true` for [`Context::Mediator`].
    pub fn is_mediator(&self) -> bool {
        matches!(self, Context::Mediator(_))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Unbound => f.write_str("Unbound"),
            Context::Value(_) => f.write_str("Value(..)"),
            Context::Mediator(_) => f.write_str("Mediator(..)"),
        }
    }
}

/// What a callback receives.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Channel being dispatched.
    pub channel: &'a str,
    /// Arguments given to `publish`/`start`.
    pub args: &'a Args,
    /// Context this invocation runs in.
    pub context: &'a Context,
}

/// Immutable callback + context pair.
pub struct Binding {
    callback: Callback,
    context: Context,
}

impl Binding {
    /// Creates a binding.
    pub fn new(callback: Callback, context: Context) -> Self {
        Self { callback, context }
    }

    /// Context registered with the binding.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Invokes the callback.
    #[inline]
    pub fn call(&self, invocation: &Invocation<'_>) -> Result<(), SubscriberError> {
        (self.callback)(invocation)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
