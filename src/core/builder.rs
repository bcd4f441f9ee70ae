use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    core::Mediator,
    events::Bus,
    loader::{Loader, UnitLoader},
    observers::{Observe, ObserverSet},
    policies::LoadErrorPolicy,
    presentation::{NoopPresenter, Presenter},
};

/// Builder for constructing a [`Mediator`] with its collaborators.
pub struct MediatorBuilder {
    cfg: Config,
    loader: Option<Arc<dyn Loader>>,
    presenter: Arc<dyn Presenter>,
    observers: Vec<Arc<dyn Observe>>,
    policy: LoadErrorPolicy,
}

impl MediatorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            loader: None,
            presenter: Arc::new(NoopPresenter),
            observers: Vec::new(),
            policy: LoadErrorPolicy,
        }
    }

    /// Sets the unit loader.
    ///
    /// Defaults to an empty [`UnitLoader`] bounded by `Config::load_timeout`.
    pub fn with_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the presentation layer used by `stop`.
    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Sets lifecycle observers.
    ///
    /// Observers receive mediator events through dedicated workers with
    /// bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Sets the loader error policy.
    pub fn with_policy(mut self, policy: LoadErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the mediator.
    ///
    /// When observers are configured this spawns their workers and the bus
    /// listener, so it must then be called inside a Tokio runtime.
    pub fn build(self) -> Mediator {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();

        let loader = self.loader.unwrap_or_else(|| {
            Arc::new(UnitLoader::new().with_timeout(self.cfg.load_timeout_opt()))
        });

        if !self.observers.is_empty() {
            let set = ObserverSet::new(self.observers, bus.clone());
            spawn_observer_listener(&bus, set, token.clone());
        }

        Mediator::from_parts(self.cfg, loader, self.presenter, self.policy, bus, token)
    }
}

/// Forwards bus events to the observer set until `token` is cancelled.
fn spawn_observer_listener(bus: &Bus, set: ObserverSet, token: CancellationToken) {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "observer listener lagged");
                        continue;
                    }
                }
            }
        }
        set.shutdown().await;
    });
}
