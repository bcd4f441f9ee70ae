//! # Units: lazily activated feature modules and their identifiers.
//!
//! This module provides:
//! - [`Unit`] - trait for a feature module with an async initializer
//! - [`UnitFn`] - closure-backed unit
//! - [`UnitRef`] - shared reference to a unit (`Arc<dyn Unit>`)
//! - [`UnitId`], [`decamelize`] - channel name → unit identifier
//! - [`SweepPattern`] - substring rule used when unloading

mod id;
mod unit;
mod unit_fn;

pub use id::{DEFAULT_DELIMITER, SweepPattern, UnitId, decamelize};
pub use unit::Unit;
pub use unit_fn::{UnitFn, UnitRef};
