//! Error types used by the mediator, the unit loader and channel callbacks.
//!
//! This module defines the error taxonomy:
//!
//! - [`MediatorError`] errors that cross the mediator boundary (resolution and subscriber failures).
//! - [`LoadError`] failures reported by a [`Loader`](crate::Loader) while resolving a unit.
//! - [`UnitError`] failures raised by a unit's own initializer.
//! - [`SubscriberError`] failures raised by a channel callback.
//!
//! The enums provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Timeouts never cross the mediator boundary: they are absorbed by the
//! [`LoadErrorPolicy`](crate::LoadErrorPolicy).

use std::time::Duration;
use thiserror::Error;

/// # Errors surfaced to callers of the mediator.
///
/// Only two kinds cross the boundary: a unit that failed to resolve for a reason
/// other than a timeout, and a channel callback that returned an error.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MediatorError {
    /// A callback failed; callbacks after `index` were not invoked for this dispatch.
    #[error("subscriber #{index} on channel {channel:?} failed: {source}")]
    Subscriber {
        /// Channel being dispatched.
        channel: String,
        /// Position of the failing binding in the channel's subscriber list.
        index: usize,
        /// Error returned by the callback.
        #[source]
        source: SubscriberError,
    },

    /// The unit backing a channel could not be resolved (non-timeout failure).
    #[error("unit {unit:?} failed to resolve: {source}")]
    Resolution {
        /// Entry id that was requested from the loader.
        unit: String,
        /// Underlying loader failure.
        #[source]
        source: LoadError,
    },

    /// The activation task was cancelled by the runtime before it could finish.
    #[error("activation of channel {channel:?} aborted: {reason}")]
    ActivationAborted {
        /// Channel whose activation was aborted.
        channel: String,
        /// Runtime-provided reason.
        reason: String,
    },
}

impl MediatorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lazybus::{MediatorError, SubscriberError};
    ///
    /// let err = MediatorError::Subscriber {
    ///     channel: "todoList".into(),
    ///     index: 0,
    ///     source: SubscriberError::new("boom"),
    /// };
    /// assert_eq!(err.as_label(), "mediator_subscriber_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            MediatorError::Subscriber { .. } => "mediator_subscriber_failed",
            MediatorError::Resolution { .. } => "mediator_resolution_failed",
            MediatorError::ActivationAborted { .. } => "mediator_activation_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            MediatorError::Subscriber {
                channel,
                index,
                source,
            } => format!("channel={channel} subscriber={index} error={source}"),
            MediatorError::Resolution { unit, source } => {
                format!("unit={unit} {}", source.as_message())
            }
            MediatorError::ActivationAborted { channel, reason } => {
                format!("channel={channel} aborted: {reason}")
            }
        }
    }
}

/// # Failures reported by a unit loader.
///
/// Every variant names the identifiers involved, see [`LoadError::ids`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Resolution did not finish within the time budget.
    #[error("load timed out after {timeout:?}; pending: {ids:?}")]
    Timeout {
        /// Identifiers still unresolved when the budget ran out.
        ids: Vec<String>,
        /// The exceeded budget.
        timeout: Duration,
    },

    /// No unit is registered under this identifier.
    #[error("unit {id:?} not found")]
    NotFound {
        /// The missing identifier.
        id: String,
    },

    /// The unit's initializer returned an error.
    #[error("unit {id:?} failed to initialize: {reason}")]
    Init {
        /// The failing identifier.
        id: String,
        /// Error reported by the initializer.
        reason: String,
    },

    /// The unit depends on itself, directly or transitively.
    #[error("dependency cycle through {id:?}")]
    Cycle {
        /// Identifier at which the cycle closed.
        id: String,
    },
}

impl LoadError {
    /// Identifiers that this failure is about.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            LoadError::Timeout { ids, .. } => ids.iter().map(String::as_str).collect(),
            LoadError::NotFound { id } | LoadError::Init { id, .. } | LoadError::Cycle { id } => {
                vec![id.as_str()]
            }
        }
    }

    /// Returns `true` for [`LoadError::Timeout`].
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use lazybus::LoadError;
    ///
    /// let err = LoadError::Timeout { ids: vec!["widgets/a/main".into()], timeout: Duration::from_secs(7) };
    /// assert!(err.is_timeout());
    /// assert!(!LoadError::NotFound { id: "x".into() }.is_timeout());
    /// ```
    pub fn is_timeout(&self) -> bool {
        matches!(self, LoadError::Timeout { .. })
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LoadError::Timeout { .. } => "load_timeout",
            LoadError::NotFound { .. } => "load_not_found",
            LoadError::Init { .. } => "load_init_failed",
            LoadError::Cycle { .. } => "load_cycle",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LoadError::Timeout { ids, timeout } => format!("timeout: {timeout:?} ids={ids:?}"),
            LoadError::NotFound { id } => format!("not found: {id}"),
            LoadError::Init { id, reason } => format!("init failed: {id}: {reason}"),
            LoadError::Cycle { id } => format!("cycle: {id}"),
        }
    }
}

/// # Errors produced by a unit initializer.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum UnitError {
    /// Initialization failed.
    #[error("unit init failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// A mediator call made during initialization failed.
    #[error("mediator call failed during init: {0}")]
    Mediator(String),
}

impl UnitError {
    /// Shorthand for [`UnitError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        UnitError::Failed {
            error: error.into(),
        }
    }
}

impl From<MediatorError> for UnitError {
    fn from(err: MediatorError) -> Self {
        UnitError::Mediator(err.to_string())
    }
}

/// Error returned by a channel callback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubscriberError {
    message: String,
}

impl SubscriberError {
    /// Creates an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message given at construction.
    pub fn message(&self) -> &str {
        &self.message
    }
}
