//! # Mediator: named channels with lazy unit activation.
//!
//! The [`Mediator`] owns a channel registry and talks to a [`Loader`] and a
//! [`Presenter`]. It exposes five operations:
//!
//! ```text
//! subscribe(channel, ctx, f)  append binding (creates channel)
//! publish(channel, args)      ├─ ≥1 binding ─► invoke all, in order, with each binding's context
//!                             └─ 0 bindings ─► start(channel, args)
//! start(channel, args)        unit = namespace/decamelize(channel)
//!                             spawn { resolve(unit/entry) ; invoke current bindings with Context::Mediator }
//!                             return Activation immediately
//! stop(channel, element)      unload(unit path) ; presenter.detach(element)
//! unload(prefix)              forget every resolved id CONTAINING prefix
//! ```
//!
//! ## Known gaps, kept on purpose
//! - Two overlapping cold starts of one channel both resolve the unit; unless the
//!   loader deduplicates, its initializer runs twice and subscribes twice.
//! - `stop` leaves the channel's bindings in place; a later publish still reaches them.
//! - `unload` matches by substring, so `widgets/todo_list` also sweeps
//!   `widgets/todo_list_archive`. Units sharing a dependency outside their own
//!   namespace are not reference-counted.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use lazybus::{Config, Context, Dispatch, Mediator, UnitFn, UnitLoader, UnitError};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let loader = Arc::new(UnitLoader::new().with_timeout(cfg.load_timeout_opt()));
//!     loader.register(UnitFn::arc("widgets/todo_list/main", |m: Mediator| async move {
//!         m.subscribe("todoList", Context::Unbound, |inv| {
//!             println!("todo: {}", inv.args[0]);
//!             Ok(())
//!         });
//!         Ok::<_, UnitError>(())
//!     }));
//!
//!     let mediator = Mediator::builder(cfg).with_loader(loader).build();
//!
//!     // Nobody listens yet: the unit is loaded, then receives the event.
//!     if let Dispatch::Activating(activation) = mediator.publish("todoList", json!("milk"))? {
//!         activation.wait().await?;
//!     }
//!     // Warm path from now on.
//!     mediator.publish("todoList", json!("eggs"))?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::core::activation::{Activation, ActivationOutcome};
use crate::core::args::Args;
use crate::core::binding::{Binding, Context, Invocation};
use crate::core::builder::MediatorBuilder;
use crate::core::registry::ChannelRegistry;
use crate::error::{LoadError, MediatorError, SubscriberError};
use crate::events::{Bus, Event, EventKind};
use crate::loader::Loader;
use crate::policies::{LoadDecision, LoadErrorPolicy};
use crate::presentation::{ElementRef, Presenter};
use crate::units::SweepPattern;

/// What a [`Mediator::publish`] call did.
#[derive(Debug)]
pub enum Dispatch {
    /// Warm path: every subscriber was invoked synchronously.
    Delivered {
        /// Number of subscribers invoked.
        subscribers: usize,
    },
    /// Cold path: the channel had no subscribers and a unit activation was started.
    Activating(Activation),
}

/// Channel mediator with lazy unit activation.
///
/// Cheap to clone; clones share the same channels, loader and event bus.
#[derive(Clone)]
pub struct Mediator {
    inner: Arc<Inner>,
}

struct Inner {
    cfg: Config,
    channels: ChannelRegistry,
    loader: Arc<dyn Loader>,
    presenter: Arc<dyn Presenter>,
    policy: LoadErrorPolicy,
    bus: Bus,
    token: CancellationToken,
}

impl Drop for Inner {
    /// The last handle going away stops the observer listener and its workers.
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl Mediator {
    /// Returns a builder for a mediator using `cfg`.
    pub fn builder(cfg: Config) -> MediatorBuilder {
        MediatorBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: Config,
        loader: Arc<dyn Loader>,
        presenter: Arc<dyn Presenter>,
        policy: LoadErrorPolicy,
        bus: Bus,
        token: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                channels: ChannelRegistry::new(),
                loader,
                presenter,
                policy,
                bus,
                token,
            }),
        }
    }

    /// Appends `callback`, bound to `context`, to `channel`'s subscriber list.
    ///
    /// Creates the channel if absent. Subscribing the same callback twice yields
    /// two invocations per publish.
    pub fn subscribe<F>(&self, channel: &str, context: Context, callback: F)
    where
        F: Fn(&Invocation<'_>) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let sub = self
            .inner
            .channels
            .subscribe(channel, Binding::new(Arc::new(callback), context));

        if sub.created {
            self.inner
                .bus
                .publish(Event::new(EventKind::ChannelCreated).with_channel(channel));
        }
        debug!(channel, subscribers = sub.subscribers, "subscribed");
        self.inner.bus.publish(
            Event::new(EventKind::Subscribed)
                .with_channel(channel)
                .with_count(sub.subscribers),
        );
    }

    /// Publishes `args` on `channel`.
    ///
    /// With at least one subscriber, invokes them all in registration order,
    /// each with its own context; the first callback error aborts the rest and
    /// is returned. Without subscribers, behaves exactly like [`start`](Self::start).
    ///
    /// The cold path spawns onto the current Tokio runtime.
    pub fn publish(&self, channel: &str, args: impl Into<Args>) -> Result<Dispatch, MediatorError> {
        let args = args.into();
        let bindings = self.inner.channels.snapshot(channel);
        if bindings.is_empty() {
            return Ok(Dispatch::Activating(self.start(channel, args)));
        }

        let invoked = self.dispatch(channel, &bindings, &args, None)?;
        trace!(channel, invoked, "published");
        self.inner.bus.publish(
            Event::new(EventKind::Published)
                .with_channel(channel)
                .with_count(invoked),
        );
        Ok(Dispatch::Delivered {
            subscribers: invoked,
        })
    }

    /// Lazily activates the unit behind `channel`, then invokes its subscribers with `args`.
    ///
    /// Returns at once; the returned [`Activation`] reports completion. Once the
    /// unit resolves, the channel's subscribers at that moment are invoked in
    /// order with [`Context::Mediator`], not their registered contexts.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(&self, channel: &str, args: impl Into<Args>) -> Activation {
        let args = args.into();
        let entry = self.inner.cfg.unit_id(channel).entry(&self.inner.cfg.entry);
        let channel: Arc<str> = Arc::from(channel);

        debug!(channel = %channel, unit = %entry, "cold start");
        self.inner.bus.publish(
            Event::new(EventKind::ActivationRequested)
                .with_channel(channel.clone())
                .with_unit(entry.as_str()),
        );

        let me = self.clone();
        let handle = tokio::spawn({
            let channel = channel.clone();
            let entry = entry.clone();
            async move { me.activate(&channel, &entry, args).await }
        });
        Activation::new(channel, entry, handle)
    }

    /// Forgets every resolved unit under `channel`'s namespace and detaches `element`.
    ///
    /// The channel's subscribers are left untouched.
    pub fn stop(&self, channel: &str, element: &ElementRef) {
        let path = self.inner.cfg.unit_id(channel).path();
        let forgotten = self.unload(&path);
        self.inner.presenter.detach(element);

        info!(channel, unit = %path, forgotten = forgotten.len(), element = %element, "unit stopped");
        self.inner.bus.publish(
            Event::new(EventKind::UnitStopped)
                .with_channel(channel)
                .with_unit(path)
                .with_count(forgotten.len()),
        );
    }

    /// Forgets every resolved identifier that contains `prefix` as a substring.
    ///
    /// Returns the forgotten identifiers.
    pub fn unload(&self, prefix: &str) -> Vec<String> {
        let sweep = SweepPattern::new(prefix);
        let loader = &self.inner.loader;

        let mut forgotten = Vec::new();
        for id in loader.resolved_ids() {
            if !sweep.matches(&id) {
                continue;
            }
            loader.forget(&id);
            self.inner.bus.publish(
                Event::new(EventKind::UnitForgotten)
                    .with_unit(id.as_str())
                    .with_reason(sweep.as_str()),
            );
            forgotten.push(id);
        }
        debug!(sweep = sweep.as_str(), forgotten = forgotten.len(), "unload sweep");
        forgotten
    }

    /// Number of subscribers currently bound to `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner.channels.subscriber_count(channel)
    }

    /// Sorted names of every channel created so far.
    pub fn channels(&self) -> Vec<String> {
        self.inner.channels.list()
    }

    /// The loader this mediator resolves units with.
    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.inner.loader
    }

    /// The configuration this mediator was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Receiver for lifecycle events published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Stops the observer listener, if any. Channels and loader are unaffected.
    ///
    /// Dropping the last handle to the mediator does the same.
    pub fn shutdown(&self) {
        self.inner.token.cancel();
    }

    /// Returns `true` if both handles share the same mediator.
    pub fn ptr_eq(&self, other: &Mediator) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    async fn activate(
        &self,
        channel: &str,
        entry: &str,
        args: Args,
    ) -> Result<ActivationOutcome, MediatorError> {
        if let Err(err) = self.inner.loader.resolve(entry, self).await {
            return match self.inner.policy.decide(self.inner.loader.as_ref(), err) {
                LoadDecision::Absorbed(err) => {
                    let mut ev = Event::new(EventKind::LoadTimedOut)
                        .with_channel(channel)
                        .with_unit(entry)
                        .with_reason(err.ids().join(","));
                    if let LoadError::Timeout { timeout, .. } = &err {
                        ev = ev.with_timeout(*timeout);
                    }
                    self.inner.bus.publish(ev);
                    Ok(ActivationOutcome::TimedOut)
                }
                LoadDecision::Escalated(err) => {
                    self.inner.bus.publish(
                        Event::new(EventKind::LoadFailed)
                            .with_channel(channel)
                            .with_unit(entry)
                            .with_reason(err.to_string()),
                    );
                    Err(MediatorError::Resolution {
                        unit: entry.to_string(),
                        source: err,
                    })
                }
            };
        }

        self.inner.bus.publish(
            Event::new(EventKind::UnitResolved)
                .with_channel(channel)
                .with_unit(entry),
        );

        let bindings = self.inner.channels.snapshot(channel);
        let context = Context::Mediator(self.clone());
        let invoked = self.dispatch(channel, &bindings, &args, Some(&context))?;

        debug!(channel, unit = entry, invoked, "activation completed");
        self.inner.bus.publish(
            Event::new(EventKind::ActivationCompleted)
                .with_channel(channel)
                .with_unit(entry)
                .with_count(invoked),
        );
        Ok(ActivationOutcome::Completed {
            subscribers: invoked,
        })
    }

    /// Invokes `bindings` in order; `context` overrides each binding's own.
    fn dispatch(
        &self,
        channel: &str,
        bindings: &[Arc<Binding>],
        args: &Args,
        context: Option<&Context>,
    ) -> Result<usize, MediatorError> {
        for (index, binding) in bindings.iter().enumerate() {
            let invocation = Invocation {
                channel,
                args,
                context: context.unwrap_or_else(|| binding.context()),
            };
            if let Err(source) = binding.call(&invocation) {
                warn!(channel, index, error = %source, "subscriber failed");
                self.inner.bus.publish(
                    Event::new(EventKind::SubscriberFailed)
                        .with_channel(channel)
                        .with_count(index)
                        .with_reason(source.message()),
                );
                return Err(MediatorError::Subscriber {
                    channel: channel.to_string(),
                    index,
                    source,
                });
            }
        }
        Ok(bindings.len())
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("namespace", &self.inner.cfg.namespace)
            .field("channels", &self.inner.channels.list())
            .finish_non_exhaustive()
    }
}
