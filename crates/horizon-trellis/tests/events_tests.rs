//! Tests for event binding, chaining and cancellation.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use horizon_trellis::events::{Bound, Handler};
use horizon_trellis::prelude::*;
use horizon_trellis::{Capabilities, ObjectBase};
use serde_json::{json, Value};

/// A source component that declares `stream` and can refuse to stream.
struct Feed {
    base: ObjectBase,
    capabilities: Capabilities,
    streamable: bool,
    checks: AtomicUsize,
}

impl Feed {
    fn new(streamable: bool) -> Self {
        Self {
            base: ObjectBase::new::<Self>(),
            capabilities: Capabilities::new(),
            streamable,
            checks: AtomicUsize::new(0),
        }
    }
}

impl Object for Feed {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl Component for Feed {
    fn component_name(&self) -> &'static str {
        "feed"
    }

    fn events(&self) -> &'static [&'static str] {
        &["stream", "change", "like", "click", "stop"]
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn check_streamable(&self) -> Result<()> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.streamable {
            Ok(())
        } else {
            Err(Error::NotStreamable {
                component: self.component_name().into(),
            })
        }
    }

    fn api_info(&self) -> Value {
        json!({"type": "string"})
    }

    fn config(&self) -> Value {
        json!({})
    }
}

fn setup() -> (Arc<Blocks>, Arc<Radio>) {
    init_global_registry();
    let blocks = Blocks::with_defaults();
    let radio = blocks.add(
        Radio::builder()
            .with_choices(["a", "b", "c"])
            .build()
            .expect("Failed to build radio"),
    );
    (blocks, radio)
}

fn noop() -> EventFn {
    EventFn::new(|_| Ok(Vec::new()))
}

fn bind(blocks: &Arc<Blocks>, radio: &Arc<Radio>, event: &str, options: ListenerOptions) -> Dependency {
    radio
        .on(blocks, event, noop(), radio.object_id(), (), options)
        .expect("Failed to bind event")
}

#[test]
fn test_bind_registers_record() {
    let (blocks, radio) = setup();
    let dep = bind(&blocks, &radio, "change", ListenerOptions::new().scroll_to_output(true));

    assert_eq!(dep.index(), 0);
    let record = blocks.dependency(0).unwrap();
    assert_eq!(record.event, "change");
    assert_eq!(record.trigger, radio.object_id());
    assert_eq!(record.inputs, vec![radio.object_id()]);
    assert!(record.outputs.is_empty());
    assert!(record.scroll_to_output);
    assert!(record.preprocess && record.postprocess);
    assert_eq!(record.show_progress, ShowProgress::Full);
    assert_eq!(record.trigger_after, None);
}

#[test]
fn test_dependency_call_passes_through() {
    let (blocks, radio) = setup();
    let upper = EventFn::new(|args| {
        args.iter()
            .map(|v| {
                v.as_str()
                    .map(|s| json!(s.to_uppercase()))
                    .ok_or_else(|| Error::callback("expected a string"))
            })
            .collect()
    });
    let dep = radio
        .on(&blocks, "input", upper, radio.object_id(), radio.object_id(), ListenerOptions::new())
        .unwrap();

    assert_eq!(dep.call(&[json!("ab")]).unwrap(), vec![json!("AB")]);
    assert!(matches!(dep.call(&[json!(1)]), Err(Error::Callback(_))));
}

#[test]
fn test_then_and_success_chain_on_ordinal() {
    let (blocks, radio) = setup();
    bind(&blocks, &radio, "change", ListenerOptions::new());
    let first = bind(&blocks, &radio, "select", ListenerOptions::new());

    let then = first.then(noop(), (), (), ListenerOptions::new()).unwrap();
    let success = first.success(noop(), (), (), ListenerOptions::new()).unwrap();

    assert_eq!(then.record().event, "then");
    assert_eq!(then.record().trigger_after, Some(first.index()));
    assert!(!then.record().trigger_only_on_success);

    assert_eq!(success.record().event, "success");
    assert_eq!(success.record().trigger_after, Some(first.index()));
    assert!(success.record().trigger_only_on_success);

    let chained = then.then(noop(), (), (), ListenerOptions::new()).unwrap();
    assert_eq!(chained.record().trigger_after, Some(then.index()));
    assert_eq!(chained.record().trigger, radio.object_id());
}

#[test]
fn test_cancels_registers_one_hidden_dependency() {
    let (blocks, radio) = setup();
    let dep_a = bind(&blocks, &radio, "change", ListenerOptions::new());
    let dep_b = bind(&blocks, &radio, "input", ListenerOptions::new());

    let stopper = bind(
        &blocks,
        &radio,
        "select",
        ListenerOptions::new().cancels(&dep_a).cancels(&dep_b),
    );

    assert_eq!(blocks.dependency_count(), stopper.index() + 2);
    assert!(stopper.record().cancels.is_empty());

    let hidden = blocks.dependency(stopper.index() + 1).unwrap();
    let targets: HashSet<usize> = hidden.cancels.iter().copied().collect();
    assert_eq!(targets, HashSet::from([dep_a.index(), dep_b.index()]));
    assert_eq!(hidden.event, "select");
    assert_eq!(hidden.api_name, ApiName::Hidden);
    assert_eq!(hidden.queue, Some(false));
    assert!(!hidden.preprocess);
    assert!(!hidden.postprocess);
}

#[test]
fn test_cancel_binding_requests_cancellation() {
    let (blocks, radio) = setup();
    let long_running = bind(&blocks, &radio, "change", ListenerOptions::new());
    let stopper = bind(&blocks, &radio, "select", ListenerOptions::new().cancels(&long_running));

    let hidden = blocks.dependency(stopper.index() + 1).unwrap();
    let func = hidden.func.as_ref().expect("cancel binding has a callback");
    assert_eq!(func.call(&[]).unwrap(), Vec::<Value>::new());

    assert_eq!(blocks.take_cancel_requests(), vec![long_running.index()]);
}

#[test]
fn test_no_cancels_no_hidden_dependency() {
    let (blocks, radio) = setup();
    bind(&blocks, &radio, "change", ListenerOptions::new());
    assert_eq!(blocks.dependency_count(), 1);
}

#[test]
fn test_cancels_from_other_container_rejected() {
    let (blocks_a, radio_a) = setup();
    let foreign = bind(&blocks_a, &radio_a, "change", ListenerOptions::new());

    let (blocks_b, radio_b) = setup();
    bind(&blocks_b, &radio_b, "input", ListenerOptions::new());
    let options = ListenerOptions::new().cancels(&foreign);
    assert_eq!(options.cancelled_indices(), vec![0]);

    let result = radio_b.on(&blocks_b, "select", noop(), (), (), options);

    match result {
        Err(Error::InvalidConfiguration { parameter, .. }) => assert_eq!(parameter, "cancels"),
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
    assert_eq!(blocks_b.dependency_count(), 1);
    assert!(blocks_b.dependency(0).unwrap().cancels.is_empty());
    assert!(!radio_b.capabilities().selectable());
    assert_eq!(blocks_a.dependency_count(), 1);
}

#[test]
fn test_rejected_cancels_leave_empty_container_untouched() {
    let (blocks_a, radio_a) = setup();
    let foreign = bind(&blocks_a, &radio_a, "change", ListenerOptions::new());
    bind(&blocks_a, &radio_a, "input", ListenerOptions::new());

    let (blocks_b, radio_b) = setup();
    let result = radio_b.on(
        &blocks_b,
        "change",
        noop(),
        (),
        (),
        ListenerOptions::new().cancels(&foreign),
    );

    assert!(result.is_err());
    assert_eq!(blocks_b.dependency_count(), 0);
    assert_eq!(blocks_b.dependencies_config(), json!([]));
}

#[test]
fn test_select_sets_selectable_once() {
    let (blocks, radio) = setup();
    let activations = Arc::new(AtomicUsize::new(0));
    let activations_clone = activations.clone();
    radio.capabilities().activated.connect(move |cap| {
        assert_eq!(*cap, Capability::Selectable);
        activations_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!radio.capabilities().selectable());
    bind(&blocks, &radio, "select", ListenerOptions::new());
    bind(&blocks, &radio, "select", ListenerOptions::new());

    assert!(radio.capabilities().selectable());
    assert!(!radio.capabilities().likeable());
    assert_eq!(activations.load(Ordering::SeqCst), 1);
}

#[test]
fn test_api_name_scenarios() {
    let (blocks, radio) = setup();
    let hidden = bind(&blocks, &radio, "change", ListenerOptions::new().api_name(false));
    let unnamed = bind(&blocks, &radio, "change", ListenerOptions::new());
    let named = bind(&blocks, &radio, "change", ListenerOptions::new().api_name("run"));
    let renamed = bind(&blocks, &radio, "change", ListenerOptions::new().api_name("run"));

    assert_eq!(hidden.record().api_name, ApiName::Hidden);
    assert_eq!(unnamed.record().api_name, ApiName::Unnamed);
    assert_eq!(named.record().api_name, ApiName::Named("run".into()));
    assert_eq!(renamed.record().api_name, ApiName::Named("run_1".into()));

    let config = blocks.dependencies_config();
    assert_eq!(config[0]["api_name"], Value::Bool(false));
    assert_eq!(config[1]["api_name"], Value::Null);
    assert_eq!(config[2]["api_name"], "run");
}

#[test]
fn test_decorator_registers_applied_function() {
    let (blocks, radio) = setup();
    let decorator = radio
        .on_decorated(&blocks, "change", radio.object_id(), (), ListenerOptions::new().api_name("deco"))
        .unwrap();
    assert_eq!(blocks.dependency_count(), 0);

    let f = EventFn::new(|args| Ok(args.to_vec())).named("deco_fn");
    let returned = decorator.apply(f.clone()).unwrap();

    assert!(returned.ptr_eq(&f));
    assert_eq!(blocks.dependency_count(), 1);
    let record = blocks.dependency(0).unwrap();
    assert_eq!(record.api_name, ApiName::Named("deco".into()));
    assert_eq!(record.inputs, vec![radio.object_id()]);
    assert!(record.func.as_ref().unwrap().ptr_eq(&f));
}

#[test]
fn test_decorator_handle_has_no_dependency() {
    let (blocks, radio) = setup();
    let trigger: Arc<dyn Component> = radio.clone();
    let bound = Events::CHANGE
        .listen(&blocks, &trigger, Handler::Decorator, (), (), ListenerOptions::new())
        .unwrap();
    assert!(matches!(bound, Bound::Decorator(_)));
    assert!(matches!(bound.into_dependency(), Err(Error::InvalidState(_))));
}

#[test]
fn test_unknown_or_undeclared_event_rejected() {
    let (blocks, radio) = setup();
    assert!(radio.on(&blocks, "bogus", noop(), (), (), ListenerOptions::new()).is_err());
    assert!(radio.on(&blocks, "click", noop(), (), (), ListenerOptions::new()).is_err());
    assert_eq!(blocks.dependency_count(), 0);
}

#[test]
fn test_stream_source_checked_before_binding() {
    init_global_registry();
    let blocks = Blocks::with_defaults();
    let feed = blocks.add(Feed::new(true));

    feed.on(&blocks, "click", noop(), (), (), ListenerOptions::new()).unwrap();
    assert_eq!(feed.checks.load(Ordering::SeqCst), 1);
    assert!(!feed.capabilities().streaming());

    let dep = feed.on(&blocks, "stream", noop(), (), feed.object_id(), ListenerOptions::new()).unwrap();
    assert_eq!(feed.checks.load(Ordering::SeqCst), 2);
    assert!(feed.capabilities().streaming());
    assert_eq!(dep.record().show_progress, ShowProgress::Hidden);
}

#[test]
fn test_unstreamable_source_rejected() {
    init_global_registry();
    let blocks = Blocks::with_defaults();
    let feed = blocks.add(Feed::new(false));

    let err = feed
        .on(&blocks, "change", noop(), (), (), ListenerOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotStreamable { .. }));
    assert_eq!(blocks.dependency_count(), 0);
}

#[test]
fn test_show_progress_defaults_and_overrides() {
    init_global_registry();
    let blocks = Blocks::with_defaults();
    let feed = blocks.add(Feed::new(true));

    let explicit = feed
        .on(&blocks, "stream", noop(), (), (), ListenerOptions::new().show_progress(ShowProgress::Minimal))
        .unwrap();
    assert_eq!(explicit.record().show_progress, ShowProgress::Minimal);

    let legacy = feed
        .on(&blocks, "change", noop(), (), (), ListenerOptions::new().show_progress(false))
        .unwrap();
    assert_eq!(legacy.record().show_progress, ShowProgress::Hidden);
}

#[test]
fn test_like_sets_likeable() {
    init_global_registry();
    let blocks = Blocks::with_defaults();
    let feed = blocks.add(Feed::new(true));
    feed.on(&blocks, "like", noop(), (), (), ListenerOptions::new()).unwrap();
    assert!(feed.capabilities().likeable());
    assert!(!feed.capabilities().selectable());
}

#[test]
fn test_queue_resolution() {
    let (blocks, radio) = setup();
    let default = bind(&blocks, &radio, "change", ListenerOptions::new());
    let forced = bind(&blocks, &radio, "change", ListenerOptions::new().queue(false));

    assert!(!blocks.is_queued(default.record()));
    blocks.enable_queue();
    assert!(blocks.is_queued(default.record()));
    assert!(!blocks.is_queued(forced.record()));
}

#[test]
fn test_every_requires_queue() {
    let (blocks, radio) = setup();
    let options = ListenerOptions::new().every(Duration::from_secs(2)).queue(false);
    assert!(radio.on(&blocks, "change", noop(), (), (), options).is_err());

    let zero = ListenerOptions::new().every(Duration::ZERO);
    assert!(radio.on(&blocks, "change", noop(), (), (), zero).is_err());

    let periodic = bind(&blocks, &radio, "change", ListenerOptions::new().every(Duration::from_secs(2)));
    assert_eq!(periodic.record().every, Some(Duration::from_secs(2)));
    assert!(blocks.validate().is_err());
    blocks.enable_queue();
    assert!(blocks.validate().is_ok());
}

#[test]
fn test_batch_options_recorded() {
    let (blocks, radio) = setup();
    let batched = bind(&blocks, &radio, "change", ListenerOptions::new().batch(true).max_batch_size(16));
    assert!(batched.record().batch);
    assert_eq!(batched.record().max_batch_size, 16);

    let zero = ListenerOptions::new().batch(true).max_batch_size(0);
    assert!(radio.on(&blocks, "change", noop(), (), (), zero).is_err());
}

#[test]
fn test_set_inputs_accepted() {
    let (blocks, radio) = setup();
    let other = blocks.add(Radio::builder().build().unwrap());

    let inputs = HashSet::from([radio.object_id(), other.object_id()]);
    let dep = radio.on(&blocks, "change", noop(), inputs, (), ListenerOptions::new()).unwrap();
    let recorded: HashSet<ObjectId> = dep.record().inputs.iter().copied().collect();
    assert_eq!(recorded, HashSet::from([radio.object_id(), other.object_id()]));

    let ordered = BTreeSet::from([radio.object_id()]);
    let dep = radio.on(&blocks, "change", noop(), ordered, [other.object_id()], ListenerOptions::new()).unwrap();
    assert_eq!(dep.record().outputs, vec![other.object_id()]);
}

#[test]
fn test_dependency_added_signal() {
    let (blocks, radio) = setup();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    blocks.dependency_added.connect(move |index| seen_clone.lock().push(*index));

    let dep_a = bind(&blocks, &radio, "change", ListenerOptions::new());
    bind(&blocks, &radio, "select", ListenerOptions::new().cancels(&dep_a));

    assert_eq!(*seen.lock(), vec![0, 1, 2]);
}

#[test]
fn test_dependency_json_export() {
    let (blocks, radio) = setup();
    let dep = radio
        .on(
            &blocks,
            "change",
            noop().named("handler"),
            radio.object_id(),
            radio.object_id(),
            ListenerOptions::new().api_name("handle"),
        )
        .unwrap();
    dep.success(noop(), (), (), ListenerOptions::new()).unwrap();

    let config = blocks.dependencies_config();
    let first = &config[0];
    assert_eq!(first["targets"], json!([[radio.object_id().as_raw(), "change"]]));
    assert_eq!(first["fn_name"], "handler");
    assert_eq!(first["backend_fn"], true);
    assert_eq!(first["show_progress"], "full");

    let second = &config[1];
    assert_eq!(second["trigger_after"], 0);
    assert_eq!(second["trigger_only_on_success"], true);
}

#[test]
fn test_capability_flags_are_per_component() {
    let (blocks, radio) = setup();
    let other = blocks.add(Radio::builder().build().unwrap());
    bind(&blocks, &radio, "select", ListenerOptions::new());

    assert!(radio.capabilities().selectable());
    assert!(!other.capabilities().selectable());
}

#[test]
fn test_stop_event_still_binds() {
    init_global_registry();
    let blocks = Blocks::with_defaults();
    let feed = blocks.add(Feed::new(true));
    let flag = Arc::new(AtomicBool::new(false));
    let flag_clone = flag.clone();
    let f = EventFn::new(move |_| {
        flag_clone.store(true, Ordering::SeqCst);
        Ok(Vec::new())
    });

    let dep = feed.on(&blocks, "stop", f, (), (), ListenerOptions::new()).unwrap();
    assert_eq!(dep.record().event, "stop");
    dep.call(&[]).unwrap();
    assert!(flag.load(Ordering::SeqCst));
}
