//! # Todo List Example
//!
//! Walks a channel through its whole lifecycle:
//! - cold start: the `todoList` unit (and its model dependency) is loaded on first publish
//! - warm path: later publishes reach the registered callbacks directly
//! - stop: the unit namespace is forgotten and the rendered element detached
//! - after stop: subscribers stay bound, so publishing is still warm
//!
//! A custom observer counts activations next to the built-in `LogWriter`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=lazybus=debug cargo run --example todo_list
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use lazybus::{
    Config, Context, Dispatch, ElementRef, Event, EventKind, Mediator, Observe, Presenter,
    SubscriberError, UnitError, UnitFn, UnitLoader,
};
use parking_lot::Mutex;
use serde_json::json;

struct ActivationCounter {
    completed: AtomicU64,
    forgotten: AtomicU64,
}

#[async_trait::async_trait]
impl Observe for ActivationCounter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ActivationCompleted => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::UnitForgotten => {
                self.forgotten.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "activation-counter"
    }
}

/// Stands in for a page: remembers which elements were removed.
#[derive(Default)]
struct Page {
    removed: Mutex<Vec<String>>,
}

impl Presenter for Page {
    fn detach(&self, element: &ElementRef) {
        println!("[page] removing {element}");
        self.removed.lock().push(element.to_string());
    }
}

fn register_units(loader: &UnitLoader) {
    let todos = Arc::new(Mutex::new(Vec::<String>::new()));

    loader.register(UnitFn::arc("widgets/todo_list/models/todo", |_m: Mediator| async {
        println!("[unit] todo model loaded");
        Ok::<_, UnitError>(())
    }));

    loader.register(Arc::new(
        UnitFn::new("widgets/todo_list/main", move |m: Mediator| {
            let todos = todos.clone();
            async move {
                println!("[unit] todo list loaded");
                m.subscribe("todoList", Context::value("#todo-list"), move |inv| {
                    let Some(item) = inv.args.get(0).and_then(|v| v.as_str()) else {
                        return Err(SubscriberError::new("todo item must be a string"));
                    };
                    let mut todos = todos.lock();
                    todos.push(item.to_string());
                    println!("[todoList] {} item(s): {:?}", todos.len(), *todos);
                    Ok(())
                });
                Ok::<_, UnitError>(())
            }
        })
        .with_dependencies(["widgets/todo_list/models/todo"]),
    ));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut cfg = Config::default();
    cfg.load_timeout = Duration::from_secs(2);

    let loader = Arc::new(UnitLoader::new().with_timeout(cfg.load_timeout_opt()));
    register_units(&loader);

    let counter = Arc::new(ActivationCounter {
        completed: AtomicU64::new(0),
        forgotten: AtomicU64::new(0),
    });
    let page = Arc::new(Page::default());

    let mut observers: Vec<Arc<dyn Observe>> = vec![counter.clone() as Arc<dyn Observe>];
    #[cfg(feature = "logging")]
    observers.push(Arc::new(lazybus::LogWriter::default()));

    let mediator = Mediator::builder(cfg)
        .with_loader(loader.clone())
        .with_presenter(page.clone())
        .with_observers(observers)
        .build();

    // Cold start: nothing subscribed to "todoList" yet.
    if let Dispatch::Activating(activation) = mediator.publish("todoList", json!("buy milk"))? {
        println!("activation outcome: {:?}", activation.wait().await?);
    }

    // Warm path.
    mediator.publish("todoList", json!("walk the dog"))?;
    if let Err(e) = mediator.publish("todoList", json!(42)) {
        println!("rejected: {}", e.as_message());
    }

    println!("loaded units: {:?}", mediator.loader().resolved_ids());
    mediator.stop("todoList", &ElementRef::from("#todo-list"));
    println!("removed elements: {:?}", page.removed.lock());

    // Subscribers survive stop, so this is still a warm publish.
    mediator.publish("todoList", json!("water plants"))?;

    // Channels without a unit time out or fail, but never panic.
    match mediator.start("calendar", ()).wait().await {
        Ok(outcome) => println!("calendar: {outcome:?}"),
        Err(e) => println!("calendar failed: {}", e.as_label()),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    println!(
        "completed activations: {}, forgotten ids: {}",
        counter.completed.load(Ordering::Relaxed),
        counter.forgotten.load(Ordering::Relaxed),
    );

    mediator.shutdown();
    Ok(())
}
