//! Failure policies.
//!
//! ## Contents
//! - [`LoadErrorPolicy`] what a failed unit resolution means for the caller
//! - [`LoadDecision`] absorbed (timeout) vs escalated (everything else)
//!
//! ## Quick wiring
//! ```text
//! Mediator::start ──► Loader::resolve ──Err──► LoadErrorPolicy::decide
//!                                                 ├─ Absorbed  → ActivationOutcome::TimedOut
//!                                                 └─ Escalated → MediatorError::Resolution
//! ```

mod load_error;

pub use load_error::{LoadDecision, LoadErrorPolicy};
