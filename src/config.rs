//! # Mediator configuration.
//!
//! Provides [`Config`] centralized settings for a [`Mediator`](crate::Mediator).
//!
//! Config is used in two ways:
//! 1. **Unit naming**: channel name → [`UnitId`] (`namespace`, `delimiter`, `entry`)
//! 2. **Builder defaults**: default loader time budget and event bus capacity
//!
//! ## Sentinel values
//! - `load_timeout = 0s` → no time budget (resolution may wait forever)

use std::time::Duration;

use crate::units::UnitId;

/// Global configuration for a mediator instance.
///
/// ## Field semantics
/// - `namespace`: path prefix every unit lives under (`"widgets"`)
/// - `entry`: entry module requested on cold start (`"main"`)
/// - `delimiter`: inserted by decamelization (`"_"`)
/// - `load_timeout`: time budget for one resolution (`0s` = none)
/// - `bus_capacity`: lifecycle event ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Namespace prefix for unit identifiers.
    pub namespace: String,

    /// Name of the entry module inside a unit's namespace.
    ///
    /// Cold start requests `<namespace>/<unit>/<entry>`.
    pub entry: String,

    /// Delimiter inserted before internal upper-case letters of a channel name.
    pub delimiter: String,

    /// Time budget for resolving a unit and its dependencies.
    ///
    /// Only applied to the default [`UnitLoader`](crate::UnitLoader) installed by the builder.
    pub load_timeout: Duration,

    /// Capacity of the lifecycle event broadcast channel.
    pub bus_capacity: usize,
}

impl Config {
    /// Derives the unit identifier for `channel`.
    ///
    /// # Example
    /// ```
    /// use lazybus::Config;
    ///
    /// let cfg = Config::default();
    /// let id = cfg.unit_id("todoList");
    /// assert_eq!(id.path(), "widgets/todo_list");
    /// assert_eq!(id.entry(&cfg.entry), "widgets/todo_list/main");
    /// ```
    #[inline]
    pub fn unit_id(&self, channel: &str) -> UnitId {
        UnitId::from_channel(channel, &self.namespace, &self.delimiter)
    }

    /// Returns the load time budget as an `Option`.
    ///
    /// - `None` → no budget
    /// - `Some(d)` → resolution fails with a timeout after `d`
    #[inline]
    pub fn load_timeout_opt(&self) -> Option<Duration> {
        if self.load_timeout == Duration::ZERO {
            None
        } else {
            Some(self.load_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `namespace = "widgets"`
    /// - `entry = "main"`
    /// - `delimiter = "_"`
    /// - `load_timeout = 7s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            namespace: "widgets".to_string(),
            entry: "main".to_string(),
            delimiter: crate::units::DEFAULT_DELIMITER.to_string(),
            load_timeout: Duration::from_secs(7),
            bus_capacity: 1024,
        }
    }
}
