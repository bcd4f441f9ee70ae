//! # Lifecycle events emitted by the mediator.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Channel events**: registry changes and dispatches (created, subscribed, published)
//! - **Activation events**: cold-start flow (requested, resolved, completed, timed out, failed)
//! - **Teardown events**: sweeps and stops (unit forgotten, unit stopped)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, channel
//! and unit names, reasons, and counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use lazybus::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::LoadFailed)
//!     .with_channel("todoList")
//!     .with_unit("widgets/todo_list/main")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::LoadFailed);
//! assert_eq!(ev.channel.as_deref(), Some("todoList"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Channel events ===
    /// First subscription to a previously unknown channel.
    ///
    /// Sets: `channel`
    ChannelCreated,

    /// A binding was appended to a channel.
    ///
    /// Sets: `channel`, `count` (subscribers after the append)
    Subscribed,

    /// A warm publish invoked every subscriber of a channel.
    ///
    /// Sets: `channel`, `count` (subscribers invoked)
    Published,

    /// A callback returned an error; remaining callbacks were skipped.
    ///
    /// Sets: `channel`, `count` (index of the failing binding), `reason`
    SubscriberFailed,

    // === Activation events ===
    /// Cold start requested resolution of a unit.
    ///
    /// Sets: `channel`, `unit` (entry id)
    ActivationRequested,

    /// The loader resolved the unit.
    ///
    /// Sets: `channel`, `unit`
    UnitResolved,

    /// Subscribers registered by the unit were invoked.
    ///
    /// Sets: `channel`, `unit`, `count` (subscribers invoked, may be 0)
    ActivationCompleted,

    /// Resolution exceeded the loader's time budget; absorbed.
    ///
    /// Sets: `channel`, `unit`, `timeout_ms`, `reason` (pending ids)
    LoadTimedOut,

    /// Resolution failed; failing ids were forgotten and the error escalated.
    ///
    /// Sets: `channel`, `unit`, `reason`
    LoadFailed,

    // === Teardown events ===
    /// A unit id was removed from the loaded-unit set by a sweep.
    ///
    /// Sets: `unit` (forgotten id), `reason` (sweep pattern)
    UnitForgotten,

    /// A channel's unit namespace was swept and its element detached.
    ///
    /// Sets: `channel`, `unit` (unit path), `count` (ids forgotten)
    UnitStopped,

    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets: `channel` (observer name), `reason` (panic info)
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets: `channel` (observer name), `reason` ("full" / "closed")
    ObserverOverflow,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Channel name (or observer name for observer events).
    pub channel: Option<Arc<str>>,
    /// Unit identifier or path.
    pub unit: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Kind-specific count (subscribers, forgotten ids, failing index).
    pub count: Option<usize>,
    /// Load time budget in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            channel: None,
            unit: None,
            reason: None,
            count: None,
            timeout_ms: None,
        }
    }

    /// Attaches a channel name.
    #[inline]
    pub fn with_channel(mut self, channel: impl Into<Arc<str>>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Attaches a unit identifier.
    #[inline]
    pub fn with_unit(mut self, unit: impl Into<Arc<str>>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_channel(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_channel(observer)
            .with_reason(info)
    }

    #[inline]
    pub fn is_observer_overflow(&self) -> bool {
        matches!(self.kind, EventKind::ObserverOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::Subscribed);
        let b = Event::new(EventKind::Subscribed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_is_stored_in_millis_and_saturates() {
        let ev = Event::new(EventKind::LoadTimedOut).with_timeout(Duration::from_secs(7));
        assert_eq!(ev.timeout_ms, Some(7_000));

        let huge = Event::new(EventKind::LoadTimedOut).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(huge.timeout_ms, Some(u32::MAX));
    }

    #[test]
    fn observer_helpers() {
        let ev = Event::observer_overflow("log", "full");
        assert!(ev.is_observer_overflow());
        assert_eq!(ev.channel.as_deref(), Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("observer=log reason=full"));

        let p = Event::observer_panicked("log", "boom".into());
        assert_eq!(p.kind, EventKind::ObserverPanicked);
        assert!(!p.is_observer_overflow());
    }
}
