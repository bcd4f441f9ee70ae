//! # LogWriter: lifecycle events as tracing records
//!
//! A minimal observer that renders incoming [`Event`]s through `tracing`.
//! Install a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! DEBUG lazybus: subscribed channel="todoList" subscribers=1
//! DEBUG lazybus: activation requested channel="todoList" unit="widgets/todo_list/main"
//!  INFO lazybus: activation completed channel="todoList" invoked=1
//!  WARN lazybus: load timed out channel="calendar" timeout_ms=7000
//!  INFO lazybus: unit stopped channel="todoList" unit="widgets/todo_list" forgotten=3
//! ```

use async_trait::async_trait;
use tracing::{debug, info, trace, warn};

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Tracing-backed event writer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let channel = e.channel.as_deref().unwrap_or("-");
        let unit = e.unit.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ChannelCreated => {
                debug!(target: "lazybus", seq = e.seq, channel, "channel created");
            }
            EventKind::Subscribed => {
                debug!(target: "lazybus", seq = e.seq, channel, subscribers = ?e.count, "subscribed");
            }
            EventKind::Published => {
                trace!(target: "lazybus", seq = e.seq, channel, invoked = ?e.count, "published");
            }
            EventKind::SubscriberFailed => {
                warn!(target: "lazybus", seq = e.seq, channel, index = ?e.count, reason, "subscriber failed");
            }
            EventKind::ActivationRequested => {
                debug!(target: "lazybus", seq = e.seq, channel, unit, "activation requested");
            }
            EventKind::UnitResolved => {
                debug!(target: "lazybus", seq = e.seq, channel, unit, "unit resolved");
            }
            EventKind::ActivationCompleted => {
                info!(target: "lazybus", seq = e.seq, channel, unit, invoked = ?e.count, "activation completed");
            }
            EventKind::LoadTimedOut => {
                warn!(target: "lazybus", seq = e.seq, channel, unit, timeout_ms = ?e.timeout_ms, pending = reason, "load timed out");
            }
            EventKind::LoadFailed => {
                warn!(target: "lazybus", seq = e.seq, channel, unit, reason, "load failed");
            }
            EventKind::UnitForgotten => {
                debug!(target: "lazybus", seq = e.seq, unit, sweep = reason, "unit forgotten");
            }
            EventKind::UnitStopped => {
                info!(target: "lazybus", seq = e.seq, channel, unit, forgotten = ?e.count, "unit stopped");
            }
            EventKind::ObserverOverflow => {
                warn!(target: "lazybus", seq = e.seq, observer = channel, reason, "observer overflow");
            }
            EventKind::ObserverPanicked => {
                warn!(target: "lazybus", seq = e.seq, observer = channel, info = reason, "observer panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
