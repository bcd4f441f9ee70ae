//! # Lifecycle observers.
//!
//! This module provides the [`Observe`] trait and the [`ObserverSet`] that fans
//! mediator lifecycle [`Event`](crate::Event)s out to observers.
//!
//! ## Architecture
//! ```text
//! Mediator ── publish(Event) ──► Bus ──► observer listener ──► ObserverSet
//!                                                         ┌────────┼────────┐
//!                                                         ▼        ▼        ▼
//!                                                     LogWriter  Metrics  Custom
//! ```
//!
//! Observers watch the mediator; they are unrelated to channel subscribers,
//! which are plain callbacks invoked synchronously by `publish`.
//!
//! ## Implementing custom observers
//! ```no_run
//! use lazybus::{Event, EventKind, Observe};
//! use async_trait::async_trait;
//!
//! struct ActivationCounter;
//!
//! #[async_trait]
//! impl Observe for ActivationCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ActivationCompleted {
//!             // increment a counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod observe;
mod set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observe::Observe;
pub use set::ObserverSet;
