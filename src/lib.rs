//! # lazybus
//!
//! **lazybus** is an in-process channel mediator that loads the code behind a
//! channel only when somebody first talks to it.
//!
//! Callbacks subscribe to named channels. Publishing on a channel that has
//! subscribers invokes them synchronously, in order. Publishing on a channel
//! nobody listens to yet starts a **cold activation**: the unit responsible for
//! the channel is resolved through a [`Loader`], its initializer subscribes, and
//! the original event is then delivered to whatever it registered.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller ── subscribe / publish / start / stop / unload ──┐
//!                                                           ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Mediator                                                         │
//! │  - ChannelRegistry (channel → ordered bindings)                   │
//! │  - Loader          (resolves units, owns the loaded-unit set)     │
//! │  - LoadErrorPolicy (timeouts absorbed, other failures escalated)  │
//! │  - Presenter       (detaches rendered elements on stop)           │
//! └──────┬──────────────────────────┬──────────────────────────┬──────┘
//!        │ warm path                │ cold path (spawned)      │ publishes
//!        ▼                          ▼                          ▼
//!   callbacks, in order     Loader::resolve(entry)     ┌───────────────────┐
//!   (binding's context)       └─► Unit::init(&Mediator)│ Bus (broadcast)   │
//!                                  └─► subscribe(..)   └─────────┬─────────┘
//!                             callbacks, in order                ▼
//!                             (Context::Mediator)       observer listener
//!                                                                ▼
//!                                                     ObserverSet (per-observer
//!                                                     queues) ─► Observe::on_event
//! ```
//!
//! ### Naming
//! ```text
//! channel "todoList"
//!   └─► decamelize ─► "todo_list"
//!   └─► unit path   ─► "widgets/todo_list"        (Config::namespace)
//!   └─► entry id    ─► "widgets/todo_list/main"   (Config::entry)
//!
//! stop("todoList", element)
//!   └─► unload("widgets/todo_list")  forgets every resolved id CONTAINING it
//!   └─► Presenter::detach(element)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------|--------------------------------------------|
//! | **Channels**      | Subscribe callbacks, publish arguments, lazy activation.   | [`Mediator`], [`Context`], [`Args`]        |
//! | **Units**         | Code behind a channel, as trait objects or closures.        | [`Unit`], [`UnitFn`], [`UnitRef`]          |
//! | **Loading**       | Catalog-backed resolution with deps and a time budget.      | [`Loader`], [`UnitLoader`]                 |
//! | **Policies**      | What a failed resolution means for the caller.              | [`LoadErrorPolicy`], [`LoadDecision`]      |
//! | **Observers**     | Hook into lifecycle events (logging, metrics, tests).       | [`Observe`], [`ObserverSet`], [`Event`]    |
//! | **Errors**        | Typed errors for mediator, loader, units and callbacks.     | [`MediatorError`], [`LoadError`]           |
//! | **Configuration** | Namespace, entry, delimiter, time budget, bus capacity.     | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging` (default): exports the tracing-backed [`LogWriter`] observer.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use lazybus::{Config, Context, Dispatch, Mediator, Observe, UnitError, UnitFn, UnitLoader};
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!
//!     let loader = Arc::new(UnitLoader::new().with_timeout(cfg.load_timeout_opt()));
//!     loader.register(UnitFn::arc("widgets/todo_list/main", |m: Mediator| async move {
//!         m.subscribe("todoList", Context::Unbound, |inv| {
//!             println!("todo: {}", inv.args[0]);
//!             Ok(())
//!         });
//!         Ok::<_, UnitError>(())
//!     }));
//!
//!     // Build observers (optional)
//!     #[cfg(feature = "logging")]
//!     let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(lazybus::LogWriter::default())];
//!     #[cfg(not(feature = "logging"))]
//!     let observers: Vec<Arc<dyn Observe>> = Vec::new();
//!
//!     let mediator = Mediator::builder(cfg)
//!         .with_loader(loader)
//!         .with_observers(observers)
//!         .build();
//!
//!     match mediator.publish("todoList", json!("buy milk"))? {
//!         Dispatch::Activating(activation) => {
//!             activation.wait().await?;
//!         }
//!         Dispatch::Delivered { .. } => unreachable!("nobody subscribed yet"),
//!     }
//!     assert_eq!(mediator.subscriber_count("todoList"), 1);
//!
//!     mediator.shutdown();
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod loader;
mod observers;
mod policies;
mod presentation;
mod units;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    Activation, ActivationOutcome, Args, Callback, Context, Dispatch, Invocation, Mediator,
    MediatorBuilder,
};
pub use error::{LoadError, MediatorError, SubscriberError, UnitError};
pub use events::{Bus, Event, EventKind};
pub use loader::{Loader, UnitLoader};
pub use observers::{Observe, ObserverSet};
pub use policies::{LoadDecision, LoadErrorPolicy};
pub use presentation::{ElementRef, NoopPresenter, Presenter};
pub use units::{DEFAULT_DELIMITER, SweepPattern, Unit, UnitFn, UnitId, UnitRef, decamelize};

// Optional: expose the tracing-backed logger observer.
// Enable with: `--features logging` (on by default)
#[cfg(feature = "logging")]
pub use observers::LogWriter;
