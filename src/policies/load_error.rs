//! # Loader error policy.
//!
//! [`LoadErrorPolicy`] decides what a failed resolution means for the mediator:
//!
//! ```text
//! LoadError::Timeout ──► warn!, nothing forgotten ──► LoadDecision::Absorbed
//!                        (the activation ends without invoking subscribers)
//!
//! any other LoadError ─► forget every failing id  ──► LoadDecision::Escalated
//!                        (the activation fails with MediatorError::Resolution)
//! ```
//!
//! Forgetting the failing ids keeps a later retry from short-circuiting on a
//! half-initialized unit. The policy never retries on its own.

use tracing::warn;

use crate::error::LoadError;
use crate::loader::Loader;

/// Outcome of [`LoadErrorPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDecision {
    /// Logged and swallowed; the caller sees no error.
    Absorbed(LoadError),
    /// Must be raised to the caller.
    Escalated(LoadError),
}

impl LoadDecision {
    /// Returns `true` for [`LoadDecision::Escalated`].
    pub fn is_escalated(&self) -> bool {
        matches!(self, LoadDecision::Escalated(_))
    }

    /// The underlying failure.
    pub fn error(&self) -> &LoadError {
        match self {
            LoadDecision::Absorbed(e) | LoadDecision::Escalated(e) => e,
        }
    }
}

/// Policy applied to every resolution failure reported by a [`Loader`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadErrorPolicy;

impl LoadErrorPolicy {
    /// Classifies `err`, forgetting the failing ids in `loader` when it escalates.
    pub fn decide(&self, loader: &dyn Loader, err: LoadError) -> LoadDecision {
        if err.is_timeout() {
            warn!(ids = ?err.ids(), error = %err, "unit load timed out");
            return LoadDecision::Absorbed(err);
        }

        for id in err.ids() {
            loader.forget(id);
        }
        warn!(label = err.as_label(), error = %err, "unit load failed");
        LoadDecision::Escalated(err)
    }
}
