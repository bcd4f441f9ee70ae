use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use super::*;
use crate::config::Config;
use crate::error::{LoadError, MediatorError, SubscriberError, UnitError};
use crate::events::{Event, EventKind};
use crate::loader::{Loader, UnitLoader};
use crate::observers::Observe;
use crate::presentation::{ElementRef, Presenter};
use crate::units::UnitFn;

#[derive(Debug, Clone, PartialEq)]
struct Call {
    tag: &'static str,
    channel: String,
    args: Args,
    mediator: bool,
    value: Option<u32>,
}

type Log = Arc<Mutex<Vec<Call>>>;

fn recorder(
    log: Log,
    tag: &'static str,
) -> impl Fn(&Invocation<'_>) -> Result<(), SubscriberError> + Send + Sync + 'static {
    move |inv: &Invocation<'_>| {
        log.lock().push(Call {
            tag,
            channel: inv.channel.to_string(),
            args: inv.args.clone(),
            mediator: inv.context.is_mediator(),
            value: inv.context.downcast_ref::<u32>().copied(),
        });
        Ok(())
    }
}

/// Loader that subscribes a recorder on every resolution, with no
/// short-circuit and no await point in between.
struct FakeLoader {
    channel: &'static str,
    log: Log,
    fail: bool,
    resolves: AtomicUsize,
    resolved: Mutex<Vec<String>>,
}

impl FakeLoader {
    fn new(channel: &'static str, log: Log) -> Self {
        Self {
            channel,
            log,
            fail: false,
            resolves: AtomicUsize::new(0),
            resolved: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl Loader for FakeLoader {
    async fn resolve(&self, id: &str, mediator: &Mediator) -> Result<(), LoadError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        self.resolved.lock().push(id.to_string());
        if self.fail {
            return Err(LoadError::Init {
                id: id.to_string(),
                reason: "boom".into(),
            });
        }
        mediator.subscribe(
            self.channel,
            Context::value(99u32),
            recorder(self.log.clone(), "unit"),
        );
        Ok(())
    }

    fn forget(&self, id: &str) -> bool {
        let mut resolved = self.resolved.lock();
        let before = resolved.len();
        resolved.retain(|r| r != id);
        before != resolved.len()
    }

    fn resolved_ids(&self) -> Vec<String> {
        self.resolved.lock().clone()
    }
}

#[derive(Default)]
struct RecordingPresenter {
    detached: Mutex<Vec<String>>,
}

impl Presenter for RecordingPresenter {
    fn detach(&self, element: &ElementRef) {
        self.detached.lock().push(element.as_str().to_string());
    }
}

fn with_fake(loader: Arc<FakeLoader>) -> Mediator {
    Mediator::builder(Config::default())
        .with_loader(loader)
        .build()
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    kinds
}

#[tokio::test]
async fn publish_invokes_subscribers_in_order_with_their_own_context() {
    let log: Log = Arc::default();
    let m = with_fake(Arc::new(FakeLoader::new("todoList", log.clone())));

    m.subscribe("todoList", Context::value(1u32), recorder(log.clone(), "a"));
    m.subscribe("todoList", Context::Unbound, recorder(log.clone(), "b"));
    m.subscribe("todoList", Context::value(3u32), recorder(log.clone(), "a"));

    let out = m
        .publish("todoList", vec![json!("milk"), json!(2)])
        .unwrap();
    assert!(matches!(out, Dispatch::Delivered { subscribers: 3 }));

    let calls = log.lock().clone();
    let tags: Vec<_> = calls.iter().map(|c| c.tag).collect();
    assert_eq!(tags, vec!["a", "b", "a"]);
    assert_eq!(
        calls.iter().map(|c| c.value).collect::<Vec<_>>(),
        vec![Some(1), None, Some(3)]
    );
    assert!(calls.iter().all(|c| !c.mediator));
    assert!(calls.iter().all(|c| c.args.as_slice() == [json!("milk"), json!(2)]));
}

#[tokio::test]
async fn publish_without_subscribers_starts_the_unit() {
    let log: Log = Arc::default();
    let loader = Arc::new(FakeLoader::new("todoList", log.clone()));
    let m = with_fake(loader.clone());

    let Dispatch::Activating(activation) = m.publish("todoList", json!("milk")).unwrap() else {
        panic!("expected a cold start");
    };
    assert_eq!(activation.channel(), "todoList");
    assert_eq!(activation.unit(), "widgets/todo_list/main");

    let outcome = activation.wait().await.unwrap();
    assert_eq!(outcome, ActivationOutcome::Completed { subscribers: 1 });
    assert_eq!(loader.resolves.load(Ordering::SeqCst), 1);
    assert_eq!(loader.resolved_ids(), vec!["widgets/todo_list/main"]);

    let calls = log.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, Args::from(json!("milk")));
    assert_eq!(calls[0].channel, "todoList");
}

#[tokio::test]
async fn cold_start_uses_mediator_context_then_warm_path_uses_binding_context() {
    let log: Log = Arc::default();
    let m = with_fake(Arc::new(FakeLoader::new("todoList", log.clone())));

    let activation = m.start("todoList", json!(1));
    activation.wait().await.unwrap();
    m.publish("todoList", json!(2)).unwrap();

    let calls = log.lock().clone();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].mediator);
    assert_eq!(calls[0].value, None);
    assert!(!calls[1].mediator);
    assert_eq!(calls[1].value, Some(99));
}

#[tokio::test]
async fn cold_start_context_is_the_same_mediator() {
    let loader = UnitLoader::new();
    let seen = Arc::new(Mutex::new(None::<bool>));
    {
        let seen = seen.clone();
        loader.register(UnitFn::arc("widgets/todo_list/main", move |m: Mediator| {
            let seen = seen.clone();
            async move {
                let own = m.clone();
                m.subscribe("todoList", Context::Unbound, move |inv: &Invocation<'_>| {
                    *seen.lock() = inv.context.as_mediator().map(|c| c.ptr_eq(&own));
                    Ok(())
                });
                Ok::<_, UnitError>(())
            }
        }));
    }
    let m = Mediator::builder(Config::default())
        .with_loader(Arc::new(loader))
        .build();

    m.start("todoList", ()).wait().await.unwrap();
    assert_eq!(*seen.lock(), Some(true));
}

#[tokio::test]
async fn stop_sweeps_by_substring_and_detaches_element() {
    let loader = Arc::new(UnitLoader::new());
    for id in [
        "widgets/todo_list/main",
        "widgets/todo_list/views/item",
        "widgets/todo_list_archive/main",
        "widgets/calendar/main",
    ] {
        loader.register(UnitFn::arc(id, |_m: Mediator| async {
            Ok::<_, UnitError>(())
        }));
    }
    let presenter = Arc::new(RecordingPresenter::default());
    let m = Mediator::builder(Config::default())
        .with_loader(loader.clone())
        .with_presenter(presenter.clone())
        .build();

    for id in loader.registered_ids() {
        loader.resolve(&id, &m).await.unwrap();
    }
    m.subscribe("todoList", Context::Unbound, |_inv: &Invocation<'_>| Ok(()));

    m.stop("todoList", &ElementRef::from("#todo-list"));

    assert_eq!(loader.resolved_ids(), vec!["widgets/calendar/main"]);
    assert_eq!(*presenter.detached.lock(), vec!["#todo-list"]);
    assert_eq!(m.subscriber_count("todoList"), 1);
}

#[tokio::test]
async fn unload_returns_forgotten_ids() {
    let log: Log = Arc::default();
    let loader = Arc::new(FakeLoader::new("todoList", log));
    let m = with_fake(loader.clone());
    loader.resolved.lock().extend([
        "widgets/a/main".to_string(),
        "widgets/ab/main".to_string(),
        "widgets/b/main".to_string(),
    ]);

    let mut forgotten = m.unload("widgets/a");
    forgotten.sort();
    assert_eq!(forgotten, vec!["widgets/a/main", "widgets/ab/main"]);
    assert_eq!(loader.resolved_ids(), vec!["widgets/b/main"]);
    assert!(m.unload("nothing").is_empty());
}

#[tokio::test(start_paused = true)]
async fn timeout_is_absorbed_and_subscribers_are_untouched() {
    let loader = UnitLoader::new().with_timeout(Some(Duration::from_secs(7)));
    loader.register(UnitFn::arc("widgets/slow_list/main", |m: Mediator| async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        m.subscribe("slowList", Context::Unbound, |_inv: &Invocation<'_>| Ok(()));
        Ok::<_, UnitError>(())
    }));
    let loader = Arc::new(loader);
    let m = Mediator::builder(Config::default())
        .with_loader(loader.clone())
        .build();
    let mut rx = m.events();

    let outcome = m.start("slowList", ()).wait().await.unwrap();
    assert_eq!(outcome, ActivationOutcome::TimedOut);
    assert_eq!(m.subscriber_count("slowList"), 0);
    assert!(loader.resolved_ids().is_empty());

    let kinds = drain(&mut rx);
    assert!(kinds.contains(&EventKind::LoadTimedOut));
    assert!(!kinds.contains(&EventKind::ActivationCompleted));
}

#[tokio::test]
async fn resolution_failure_forgets_ids_and_escalates() {
    let log: Log = Arc::default();
    let loader = Arc::new(FakeLoader::new("todoList", log.clone()).failing());
    let m = with_fake(loader.clone());

    let err = m.start("todoList", ()).wait().await.unwrap_err();
    match &err {
        MediatorError::Resolution { unit, source } => {
            assert_eq!(unit, "widgets/todo_list/main");
            assert_eq!(source.as_label(), "load_init_failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(loader.resolved_ids().is_empty());
    assert!(log.lock().is_empty());
    assert_eq!(m.subscriber_count("todoList"), 0);
}

/// `UnitLoader` that records every id the mediator asks it to forget.
struct ForgetLog {
    inner: UnitLoader,
    forgotten: Mutex<Vec<String>>,
}

#[async_trait]
impl Loader for ForgetLog {
    async fn resolve(&self, id: &str, mediator: &Mediator) -> Result<(), LoadError> {
        self.inner.resolve(id, mediator).await
    }

    fn forget(&self, id: &str) -> bool {
        self.forgotten.lock().push(id.to_string());
        self.inner.forget(id)
    }

    fn resolved_ids(&self) -> Vec<String> {
        self.inner.resolved_ids()
    }
}

fn todo_list_with_deps(deps: &[&'static str]) -> UnitLoader {
    let loader = UnitLoader::new();
    loader.register(UnitFn::arc("widgets/todo_list/models/todo", |_m: Mediator| async {
        Ok::<_, UnitError>(())
    }));
    loader.register(UnitFn::arc("widgets/todo_list/views/item", |_m: Mediator| async {
        Err::<(), _>(UnitError::failed("template missing"))
    }));
    loader.register(Arc::new(
        UnitFn::new("widgets/todo_list/main", |m: Mediator| async move {
            m.subscribe("todoList", Context::Unbound, |_inv: &Invocation<'_>| Ok(()));
            Ok::<_, UnitError>(())
        })
        .with_dependencies(deps.iter().copied()),
    ));
    loader
}

#[tokio::test]
async fn failing_dependency_is_forgotten_instead_of_the_root() {
    let loader = Arc::new(ForgetLog {
        inner: todo_list_with_deps(&[
            "widgets/todo_list/models/todo",
            "widgets/todo_list/views/item",
        ]),
        forgotten: Mutex::new(Vec::new()),
    });
    let m = Mediator::builder(Config::default())
        .with_loader(loader.clone())
        .build();

    let err = m.start("todoList", ()).wait().await.unwrap_err();
    let MediatorError::Resolution { unit, source } = err else {
        panic!("expected a resolution failure");
    };
    assert_eq!(unit, "widgets/todo_list/main");
    assert_eq!(source.as_label(), "load_init_failed");
    assert_eq!(source.ids(), vec!["widgets/todo_list/views/item"]);

    assert_eq!(*loader.forgotten.lock(), vec!["widgets/todo_list/views/item"]);
    assert_eq!(loader.resolved_ids(), vec!["widgets/todo_list/models/todo"]);
    assert_eq!(m.subscriber_count("todoList"), 0);
}

#[tokio::test]
async fn missing_dependency_is_forgotten_instead_of_the_root() {
    let loader = Arc::new(ForgetLog {
        inner: todo_list_with_deps(&["widgets/todo_list/models/missing"]),
        forgotten: Mutex::new(Vec::new()),
    });
    let m = Mediator::builder(Config::default())
        .with_loader(loader.clone())
        .build();

    let err = m.start("todoList", ()).wait().await.unwrap_err();
    let MediatorError::Resolution { source, .. } = err else {
        panic!("expected a resolution failure");
    };
    assert_eq!(
        source,
        LoadError::NotFound {
            id: "widgets/todo_list/models/missing".into()
        }
    );
    assert_eq!(*loader.forgotten.lock(), vec!["widgets/todo_list/models/missing"]);
    assert!(loader.resolved_ids().is_empty());
}

#[tokio::test]
async fn concurrent_cold_starts_are_not_deduplicated() {
    let log: Log = Arc::default();
    let loader = Arc::new(FakeLoader::new("todoList", log.clone()));
    let m = with_fake(loader.clone());

    let first = m.start("todoList", json!("a"));
    let second = m.start("todoList", json!("b"));
    let a = first.wait().await.unwrap();
    let b = second.wait().await.unwrap();

    assert_eq!(loader.resolves.load(Ordering::SeqCst), 2);
    assert_eq!(m.subscriber_count("todoList"), 2);
    let mut invoked = [a, b].map(|o| match o {
        ActivationOutcome::Completed { subscribers } => subscribers,
        ActivationOutcome::TimedOut => 0,
    });
    invoked.sort_unstable();
    assert_eq!(invoked, [1, 2]);
    assert_eq!(log.lock().len(), 3);
}

#[tokio::test]
async fn overlapping_unit_loader_starts_run_init_twice() {
    let runs = Arc::new(AtomicUsize::new(0));
    let loader = UnitLoader::new();
    {
        let runs = runs.clone();
        loader.register(UnitFn::arc("widgets/todo_list/main", move |m: Mediator| {
            let runs = runs.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                m.subscribe("todoList", Context::Unbound, |_inv: &Invocation<'_>| Ok(()));
                Ok::<_, UnitError>(())
            }
        }));
    }
    let m = Mediator::builder(Config::default())
        .with_loader(Arc::new(loader))
        .build();

    let first = m.start("todoList", ());
    let second = m.start("todoList", ());
    first.wait().await.unwrap();
    second.wait().await.unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(m.subscriber_count("todoList"), 2);
}

#[tokio::test]
async fn subscriber_error_aborts_remaining_callbacks() {
    let log: Log = Arc::default();
    let m = with_fake(Arc::new(FakeLoader::new("todoList", log.clone())));
    let mut rx = m.events();

    m.subscribe("todoList", Context::Unbound, recorder(log.clone(), "first"));
    m.subscribe("todoList", Context::Unbound, |_inv: &Invocation<'_>| {
        Err(SubscriberError::new("bad item"))
    });
    m.subscribe("todoList", Context::Unbound, recorder(log.clone(), "third"));

    let err = m.publish("todoList", ()).unwrap_err();
    match err {
        MediatorError::Subscriber {
            channel,
            index,
            source,
        } => {
            assert_eq!(channel, "todoList");
            assert_eq!(index, 1);
            assert_eq!(source.message(), "bad item");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let tags: Vec<_> = log.lock().iter().map(|c| c.tag).collect();
    assert_eq!(tags, vec!["first"]);
    assert!(drain(&mut rx).contains(&EventKind::SubscriberFailed));
}

#[tokio::test]
async fn unit_that_never_subscribes_completes_with_zero() {
    let loader = UnitLoader::new();
    loader.register(UnitFn::arc("widgets/quiet/main", |_m: Mediator| async {
        Ok::<_, UnitError>(())
    }));
    let m = Mediator::builder(Config::default())
        .with_loader(Arc::new(loader))
        .build();

    let outcome = m.start("quiet", ()).wait().await.unwrap();
    assert_eq!(outcome, ActivationOutcome::Completed { subscribers: 0 });
    assert!(m.channels().is_empty());
}

#[tokio::test]
async fn callbacks_may_subscribe_reentrantly() {
    let m = Mediator::builder(Config::default()).build();
    let inner_calls = Arc::new(AtomicUsize::new(0));
    {
        let m2 = m.clone();
        let inner_calls = inner_calls.clone();
        m.subscribe("outer", Context::Unbound, move |_inv: &Invocation<'_>| {
            let inner_calls = inner_calls.clone();
            m2.subscribe("outer", Context::Unbound, move |_inv: &Invocation<'_>| {
                inner_calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });
    }

    let first = m.publish("outer", ()).unwrap();
    assert!(matches!(first, Dispatch::Delivered { subscribers: 1 }));
    assert_eq!(inner_calls.load(Ordering::SeqCst), 0);
    assert_eq!(m.subscriber_count("outer"), 2);

    m.publish("outer", ()).unwrap();
    assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn events_trace_the_activation() {
    let log: Log = Arc::default();
    let m = with_fake(Arc::new(FakeLoader::new("todoList", log)));
    let mut rx = m.events();

    m.start("todoList", ()).wait().await.unwrap();
    m.publish("todoList", ()).unwrap();
    m.stop("todoList", &ElementRef::from("#todo"));

    assert_eq!(
        drain(&mut rx),
        vec![
            EventKind::ActivationRequested,
            EventKind::ChannelCreated,
            EventKind::Subscribed,
            EventKind::UnitResolved,
            EventKind::ActivationCompleted,
            EventKind::Published,
            EventKind::UnitForgotten,
            EventKind::UnitStopped,
        ]
    );
}

struct Counting {
    seen: Arc<AtomicUsize>,
}

#[async_trait]
impl Observe for Counting {
    async fn on_event(&self, _event: &Event) {
        self.seen.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

#[tokio::test]
async fn observers_receive_bus_events() {
    let seen = Arc::new(AtomicUsize::new(0));
    let m = Mediator::builder(Config::default())
        .with_observers(vec![Arc::new(Counting { seen: seen.clone() }) as Arc<dyn Observe>])
        .build();

    m.subscribe("todoList", Context::Unbound, |_inv: &Invocation<'_>| Ok(()));
    m.publish("todoList", ()).unwrap();

    tokio::time::timeout(Duration::from_secs(1), async {
        while seen.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    m.shutdown();
}

#[tokio::test]
async fn dropping_the_mediator_releases_observers() {
    let observer = Arc::new(Counting {
        seen: Arc::new(AtomicUsize::new(0)),
    });
    let m = Mediator::builder(Config::default())
        .with_observers(vec![observer.clone() as Arc<dyn Observe>])
        .build();
    m.subscribe("todoList", Context::Unbound, |_inv: &Invocation<'_>| Ok(()));
    assert!(Arc::strong_count(&observer) > 1);

    drop(m);

    tokio::time::timeout(Duration::from_secs(1), async {
        while Arc::strong_count(&observer) > 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(Arc::strong_count(&observer), 1);
}

#[test]
fn building_without_observers_needs_no_runtime() {
    let m = Mediator::builder(Config::default()).build();
    assert_eq!(m.config().namespace, "widgets");
    assert!(m.channels().is_empty());
    assert!(m.loader().resolved_ids().is_empty());
}
