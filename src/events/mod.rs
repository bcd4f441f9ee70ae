//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/observe what the mediator does: channel registrations, cold-start
//! activations, loader failures and teardown sweeps.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Mediator` (subscribe/publish/start/stop/unload),
//!   `ObserverSet` workers (overflow/panic).
//! - **Consumers**: the observer listener spawned by `MediatorBuilder::build`
//!   (fans out to `ObserverSet`), and any receiver from `Mediator::events()`.
//!
//! Lifecycle events are **not** channel messages: channel callbacks are
//! invoked synchronously by the mediator and never go through this bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
