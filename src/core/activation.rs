//! # Cold-start activation handle.
//!
//! [`Mediator::start`](crate::Mediator::start) returns immediately with an
//! [`Activation`]: the single completion/failure channel of one lazy activation.
//!
//! ```text
//! start(channel, args)
//!   └─► tokio::spawn ─► Loader::resolve(entry) ─► dispatch(snapshot, Context::Mediator)
//!                                                   │
//! Activation::wait() ◄──────────────────────────────┘
//!   ├─ Ok(Completed { subscribers })   unit resolved, callbacks ran (maybe 0)
//!   ├─ Ok(TimedOut)                    budget exceeded, no callback ran
//!   └─ Err(MediatorError)              resolution failure / callback failure
//! ```
//!
//! ## Rules
//! - Dropping the handle detaches: the activation keeps running.
//! - There is no cancel operation.
//! - A callback panic inside the activation is resumed in the task awaiting
//!   [`Activation::wait`].

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::MediatorError;

/// How an activation finished without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The unit resolved and the channel's current subscribers were invoked.
    Completed {
        /// Number of subscribers invoked (0 if the unit never subscribed).
        subscribers: usize,
    },
    /// The loader's time budget ran out; subscribers were not invoked.
    TimedOut,
}

/// Handle to an in-flight cold start.
#[derive(Debug)]
pub struct Activation {
    channel: Arc<str>,
    unit: String,
    handle: JoinHandle<Result<ActivationOutcome, MediatorError>>,
}

impl Activation {
    pub(crate) fn new(
        channel: Arc<str>,
        unit: String,
        handle: JoinHandle<Result<ActivationOutcome, MediatorError>>,
    ) -> Self {
        Self {
            channel,
            unit,
            handle,
        }
    }

    /// Channel being activated.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Entry id requested from the loader.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Returns `true` once the activation has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the activation to finish.
    pub async fn wait(self) -> Result<ActivationOutcome, MediatorError> {
        match self.handle.await {
            Ok(res) => res,
            Err(je) if je.is_panic() => std::panic::resume_unwind(je.into_panic()),
            Err(je) => Err(MediatorError::ActivationAborted {
                channel: self.channel.to_string(),
                reason: je.to_string(),
            }),
        }
    }

    /// Lets the activation run to completion unobserved.
    pub fn detach(self) {}
}
