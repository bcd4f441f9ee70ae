//! # Catalog-backed unit loader.
//!
//! [`UnitLoader`] keeps two tables:
//! - the **catalog**: every registered [`Unit`](crate::Unit) by identifier;
//! - the **loaded-unit set**: identifiers whose initializer has completed,
//!   mapped to their resolved location (`<base_url>/<id>`).
//!
//! ## Resolution
//! ```text
//! resolve(id)
//!   ├─ already resolved?  ──► Ok (no re-init)
//!   ├─ id on current chain ─► Err(Cycle)
//!   ├─ not in catalog      ─► Err(NotFound)
//!   ├─ resolve every dependency (depth-first, in declared order)
//!   ├─ unit.init(&mediator) ─► Err(Init) on failure
//!   └─ record id → location
//! ```
//! The whole tree is bounded by the optional time budget; when it runs out the
//! loader reports [`LoadError::Timeout`] with every identifier of the tree that
//! is still unresolved.
//!
//! ## Rules
//! - Locks are never held across an initializer.
//! - An identifier is recorded only **after** its initializer completes, so two
//!   overlapping resolutions of the same id may both run it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::debug;

use crate::core::Mediator;
use crate::error::LoadError;
use crate::loader::Loader;
use crate::units::UnitRef;

/// Default location prefix for resolved units.
const DEFAULT_BASE_URL: &str = "units";

/// Catalog-backed [`Loader`].
pub struct UnitLoader {
    catalog: RwLock<HashMap<String, UnitRef>>,
    resolved: RwLock<HashMap<String, Arc<str>>>,
    base_url: Arc<str>,
    timeout: Option<Duration>,
}

impl UnitLoader {
    /// Creates an empty loader without a time budget.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(HashMap::new()),
            resolved: RwLock::new(HashMap::new()),
            base_url: Arc::from(DEFAULT_BASE_URL),
            timeout: None,
        }
    }

    /// Sets the time budget for one resolution (`None` = unbounded).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|d| *d > Duration::ZERO);
        self
    }

    /// Sets the prefix used to build resolved locations.
    pub fn with_base_url(mut self, base_url: impl Into<Arc<str>>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Adds a unit to the catalog, returning the unit it replaced.
    ///
    /// Registration does not touch the loaded-unit set.
    pub fn register(&self, unit: UnitRef) -> Option<UnitRef> {
        let id = unit.id().to_string();
        self.catalog.write().insert(id, unit)
    }

    /// Sorted identifiers of every registered unit.
    pub fn registered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.catalog.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Resolved location of `id`, if it is loaded.
    pub fn location(&self, id: &str) -> Option<Arc<str>> {
        self.resolved.read().get(id).cloned()
    }

    /// Configured time budget.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn contains(&self, id: &str) -> bool {
        self.resolved.read().contains_key(id)
    }

    fn resolve_tree<'a>(
        &'a self,
        id: String,
        mediator: &'a Mediator,
        mut chain: Vec<String>,
    ) -> BoxFuture<'a, Result<(), LoadError>> {
        async move {
            if self.contains(&id) {
                return Ok(());
            }
            if chain.contains(&id) {
                return Err(LoadError::Cycle { id });
            }

            let unit = self.catalog.read().get(&id).cloned();
            let unit = unit.ok_or_else(|| LoadError::NotFound { id: id.clone() })?;

            chain.push(id.clone());
            for dep in unit.dependencies() {
                self.resolve_tree(dep.clone(), mediator, chain.clone())
                    .await?;
            }

            debug!(unit = %id, "initializing unit");
            unit.init(mediator).await.map_err(|e| LoadError::Init {
                id: id.clone(),
                reason: e.to_string(),
            })?;

            let location: Arc<str> = Arc::from(format!("{}/{}", self.base_url, id));
            debug!(unit = %id, location = %location, "unit resolved");
            self.resolved.write().insert(id, location);
            Ok(())
        }
        .boxed()
    }

    /// Every identifier of the tree rooted at `root` that is not resolved yet.
    fn pending(&self, root: &str) -> Vec<String> {
        let catalog = self.catalog.read();
        let resolved = self.resolved.read();

        let mut seen = HashSet::new();
        let mut stack = vec![root.to_string()];
        let mut pending = Vec::new();

        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) || resolved.contains_key(&id) {
                continue;
            }
            if let Some(unit) = catalog.get(&id) {
                stack.extend(unit.dependencies().iter().rev().cloned());
            }
            pending.push(id);
        }
        pending
    }
}

impl Default for UnitLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Loader for UnitLoader {
    async fn resolve(&self, id: &str, mediator: &Mediator) -> Result<(), LoadError> {
        let tree = self.resolve_tree(id.to_string(), mediator, Vec::new());
        match self.timeout {
            Some(budget) => match tokio::time::timeout(budget, tree).await {
                Ok(res) => res,
                Err(_elapsed) => Err(LoadError::Timeout {
                    ids: self.pending(id),
                    timeout: budget,
                }),
            },
            None => tree.await,
        }
    }

    fn forget(&self, id: &str) -> bool {
        let known = self.resolved.write().remove(id).is_some();
        if known {
            debug!(unit = %id, "unit forgotten");
        }
        known
    }

    fn resolved_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.resolved.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    fn is_resolved(&self, id: &str) -> bool {
        self.contains(id)
    }
}
