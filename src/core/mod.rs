//! Mediator core: channels, dispatch, and lazy activation.
//!
//! The only entry point most callers need is [`Mediator`]; everything else here
//! describes what flows through it.
//!
//! Internal modules:
//! - [`mediator`]: subscribe/publish/start/stop/unload over a channel registry;
//! - [`builder`]: wires loader, presenter, policy and observers into a mediator;
//! - [`activation`]: handle returned by a cold start;
//! - [`binding`]: callback + context pairs and what callbacks receive;
//! - [`registry`]: channel name → ordered bindings;
//! - [`args`]: shared, cheaply cloned event arguments.

mod activation;
mod args;
mod binding;
mod builder;
mod mediator;
mod registry;

#[cfg(test)]
mod tests;

pub use activation::{Activation, ActivationOutcome};
pub use args::Args;
pub use binding::{Callback, Context, Invocation};
pub use builder::MediatorBuilder;
pub use mediator::{Dispatch, Mediator};
