//! # Unit loading.
//!
//! The mediator never runs unit code itself: it asks a [`Loader`] to resolve
//! an identifier, and the loader owns the **loaded-unit set** (identifier →
//! resolved location).
//!
//! ```text
//! Mediator::start ──► Loader::resolve(id) ──► deps first ──► Unit::init(&Mediator)
//!                                                              └─► (subscribe ...)
//! Mediator::unload ─► Loader::resolved_ids() ─► SweepPattern ─► Loader::forget(id)
//! ```
//!
//! ## Contract
//! - A resolved identifier short-circuits later resolutions.
//! - A forgotten identifier must re-run initialization on the next resolution.
//! - Overlapping resolutions of the same identifier are **not** required to be
//!   deduplicated; callers must not assume exactly-once initialization.
//!
//! [`UnitLoader`] is the catalog-backed default implementation.

mod catalog;

pub use catalog::UnitLoader;

use async_trait::async_trait;

use crate::core::Mediator;
use crate::error::LoadError;

/// Contract for unit loaders.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    /// Resolves `id` (and whatever it depends on), running initialization code
    /// for everything not yet resolved.
    ///
    /// `mediator` is handed to unit initializers so they can subscribe.
    async fn resolve(&self, id: &str, mediator: &Mediator) -> Result<(), LoadError>;

    /// Forgets `id`, so the next resolution re-runs its initializer.
    ///
    /// Returns `true` if the identifier was resolved.
    fn forget(&self, id: &str) -> bool;

    /// Identifiers currently in the loaded-unit set.
    fn resolved_ids(&self) -> Vec<String>;

    /// Returns `true` if `id` is in the loaded-unit set.
    fn is_resolved(&self, id: &str) -> bool {
        self.resolved_ids().iter().any(|r| r == id)
    }
}
