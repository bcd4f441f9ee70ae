//! # Channel registry - channel name → ordered bindings.
//!
//! ## Rules
//! - A channel is created implicitly by its first subscription and never removed.
//! - Bindings keep insertion order; that order is the invocation order.
//! - The same callback subscribed twice is two bindings (no deduplication).
//! - Dispatch works on a [`snapshot`](ChannelRegistry::snapshot): callbacks run
//!   without the lock held, so they may subscribe or publish themselves.
//!   Bindings appended during a dispatch are seen by the next one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::binding::Binding;

/// Result of appending a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// `true` if this call created the channel.
    pub created: bool,
    /// Number of bindings on the channel after the append.
    pub subscribers: usize,
}

/// In-process channel table owned by one mediator.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<String, Vec<Arc<Binding>>>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `binding` to `channel`, creating the channel if absent.
    pub fn subscribe(&self, channel: &str, binding: Binding) -> Subscription {
        let mut channels = self.channels.write();
        let created = !channels.contains_key(channel);
        let list = channels.entry(channel.to_string()).or_default();
        list.push(Arc::new(binding));
        Subscription {
            created,
            subscribers: list.len(),
        }
    }

    /// Current bindings of `channel`, in order (empty if the channel is unknown).
    pub fn snapshot(&self, channel: &str) -> Vec<Arc<Binding>> {
        self.channels
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of bindings on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.read().get(channel).map_or(0, Vec::len)
    }

    /// Returns sorted list of channel names.
    pub fn list(&self) -> Vec<String> {
        let channels = self.channels.read();
        let mut names: Vec<String> = channels.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
