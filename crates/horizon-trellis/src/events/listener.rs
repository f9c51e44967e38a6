//! Binding callbacks to component events.
//!
//! [`EventListener::listen`] is the single entry point: it registers a
//! callback on a component's event with the hosting [`Blocks`] container and
//! hands back a [`Dependency`] for chaining and cancellation. Most code goes
//! through the [`EventTarget`] extension methods instead:
//!
//! ```
//! use horizon_trellis::prelude::*;
//! use serde_json::json;
//!
//! init_global_registry();
//! let blocks = Blocks::with_defaults();
//! let radio = blocks.add(Radio::builder().with_choices(["a", "b"]).build().unwrap());
//! let label = blocks.add(Radio::builder().build().unwrap());
//!
//! let echo = EventFn::new(|args| Ok(args.to_vec())).named("echo");
//! let dep = radio
//!     .on(&blocks, "change", echo, radio.object_id(), label.object_id(), ListenerOptions::new())
//!     .unwrap();
//!
//! assert_eq!(dep.index(), 0);
//! assert_eq!(dep.call(&[json!("a")]).unwrap(), vec![json!("a")]);
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use horizon_trellis_core::logging::targets;
use horizon_trellis_core::ObjectId;
use serde_json::Value;

use super::catalog::{EventListener, Events, ShowProgress};
use super::dependency::Dependency;
use crate::blocks::{Blocks, EventTrigger};
use crate::component::Component;
use crate::deprecation::{self, warn_deprecation};
use crate::error::{Error, Result};

type Callback = dyn Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync;

/// A callback bound to an event.
///
/// The callback receives one value per input component (or, for batched
/// bindings, one list of values per input) and returns one value per output.
/// Cloning is cheap and clones share the same function.
#[derive(Clone)]
pub struct EventFn {
    name: Option<String>,
    inner: Arc<Callback>,
}

impl EventFn {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>> + Send + Sync + 'static,
    {
        Self {
            name: None,
            inner: Arc::new(f),
        }
    }

    /// Attach a name, reported in the render-layer config.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The callback's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the callback.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>> {
        (self.inner)(args)
    }

    /// Whether two handles wrap the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EventFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFn").field("name", &self.name).finish_non_exhaustive()
    }
}

/// What to bind: a function, or a request for a decorator.
#[derive(Debug, Clone)]
pub enum Handler {
    /// Bind this function now.
    Function(EventFn),
    /// Return a [`Decorator`] that binds whatever function it is applied to.
    Decorator,
}

impl From<EventFn> for Handler {
    fn from(f: EventFn) -> Self {
        Self::Function(f)
    }
}

/// How a binding is exposed in the generated API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ApiName {
    /// Not exposed.
    Hidden,
    /// Exposed without a name.
    #[default]
    Unnamed,
    /// Exposed under this name.
    Named(String),
}

impl ApiName {
    /// The exposed name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Whether the binding is exposed at all.
    pub fn is_exposed(&self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// Wire form: `false`, `null`, or the name.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Hidden => Value::Bool(false),
            Self::Unnamed => Value::Null,
            Self::Named(name) => Value::String(name.clone()),
        }
    }
}

impl From<&str> for ApiName {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ApiName {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// `false` hides the binding; `true` exposes it unnamed.
impl From<bool> for ApiName {
    fn from(exposed: bool) -> Self {
        if exposed { Self::Unnamed } else { Self::Hidden }
    }
}

/// `None` is unnamed, `Some(name)` is named.
impl From<Option<String>> for ApiName {
    fn from(name: Option<String>) -> Self {
        name.map_or(Self::Unnamed, Self::Named)
    }
}

macro_rules! component_list {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(Vec<ObjectId>);

        impl $name {
            /// The component ids, in order.
            pub fn ids(&self) -> &[ObjectId] {
                &self.0
            }

            /// Whether the list is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Number of components.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            fn into_vec(self) -> Vec<ObjectId> {
                self.0
            }
        }

        impl From<()> for $name {
            fn from(_: ()) -> Self {
                Self::default()
            }
        }

        impl From<ObjectId> for $name {
            fn from(id: ObjectId) -> Self {
                Self(vec![id])
            }
        }

        impl From<Option<ObjectId>> for $name {
            fn from(id: Option<ObjectId>) -> Self {
                Self(id.into_iter().collect())
            }
        }

        impl From<Vec<ObjectId>> for $name {
            fn from(ids: Vec<ObjectId>) -> Self {
                Self(ids)
            }
        }

        impl From<&[ObjectId]> for $name {
            fn from(ids: &[ObjectId]) -> Self {
                Self(ids.to_vec())
            }
        }

        impl<const N: usize> From<[ObjectId; N]> for $name {
            fn from(ids: [ObjectId; N]) -> Self {
                Self(ids.to_vec())
            }
        }
    };
}

component_list! {
    /// Input components of a binding.
    ///
    /// Accepts a single id, an ordered list, or an unordered set. A set's
    /// iteration order is unspecified, so callers must not rely on the
    /// positional order of set inputs.
    Inputs
}

component_list! {
    /// Output components of a binding. Always ordered.
    Outputs
}

impl From<HashSet<ObjectId>> for Inputs {
    fn from(ids: HashSet<ObjectId>) -> Self {
        Self(ids.into_iter().collect())
    }
}

impl From<BTreeSet<ObjectId>> for Inputs {
    fn from(ids: BTreeSet<ObjectId>) -> Self {
        Self(ids.into_iter().collect())
    }
}

/// A binding to cancel, tagged with the container that owns it.
#[derive(Clone)]
struct CancelTarget {
    blocks: Arc<Blocks>,
    index: usize,
}

impl fmt::Debug for CancelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CancelTarget({})", self.index)
    }
}

impl CancelTarget {
    /// The target's ordinal, if it names an existing binding in `blocks`.
    fn resolve(&self, blocks: &Arc<Blocks>) -> Result<usize> {
        if !Arc::ptr_eq(&self.blocks, blocks) {
            return Err(Error::invalid_configuration(
                "cancels",
                format!("dependency {} belongs to a different container", self.index),
            ));
        }
        if self.index >= blocks.dependency_count() {
            return Err(Error::invalid_configuration(
                "cancels",
                format!("dependency {} is not registered", self.index),
            ));
        }
        Ok(self.index)
    }
}

/// Options accepted when binding an event.
#[derive(Debug, Clone)]
pub struct ListenerOptions {
    /// How the binding appears in the generated API.
    pub api_name: ApiName,
    /// Scroll to the outputs when the callback completes.
    pub scroll_to_output: bool,
    /// Progress display; `None` uses the event kind's default.
    pub show_progress: Option<ShowProgress>,
    /// Queue override; `None` uses the container default.
    pub queue: Option<bool>,
    /// Call the callback with batched inputs.
    pub batch: bool,
    /// Largest batch; `None` uses the container default.
    pub max_batch_size: Option<usize>,
    /// Run input preprocessing.
    pub preprocess: bool,
    /// Run output postprocessing.
    pub postprocess: bool,
    cancels: Vec<CancelTarget>,
    /// Re-run period while a client is connected.
    pub every: Option<Duration>,
    status_tracker: bool,
}

impl Default for ListenerOptions {
    fn default() -> Self {
        Self {
            api_name: ApiName::Unnamed,
            scroll_to_output: false,
            show_progress: None,
            queue: None,
            batch: false,
            max_batch_size: None,
            preprocess: true,
            postprocess: true,
            cancels: Vec::new(),
            every: None,
            status_tracker: false,
        }
    }
}

impl ListenerOptions {
    /// Options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API exposure.
    pub fn api_name(mut self, api_name: impl Into<ApiName>) -> Self {
        self.api_name = api_name.into();
        self
    }

    /// Hide the binding from the generated API.
    pub fn hide_api(mut self) -> Self {
        self.api_name = ApiName::Hidden;
        self
    }

    /// Scroll to the outputs on completion.
    pub fn scroll_to_output(mut self, scroll: bool) -> Self {
        self.scroll_to_output = scroll;
        self
    }

    /// Set the progress display. Accepts a mode or a legacy boolean.
    pub fn show_progress(mut self, show_progress: impl Into<ShowProgress>) -> Self {
        self.show_progress = Some(show_progress.into());
        self
    }

    /// Force queueing on or off.
    pub fn queue(mut self, queue: bool) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Enable batching.
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Set the largest batch size.
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = Some(size);
        self
    }

    /// Toggle input preprocessing.
    pub fn preprocess(mut self, preprocess: bool) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Toggle output postprocessing.
    pub fn postprocess(mut self, postprocess: bool) -> Self {
        self.postprocess = postprocess;
        self
    }

    /// Cancel `dependency` whenever this event fires.
    ///
    /// `dependency` must belong to the container this binding is
    /// registered with.
    pub fn cancels(mut self, dependency: &Dependency) -> Self {
        self.cancels.push(CancelTarget {
            blocks: dependency.blocks().clone(),
            index: dependency.index(),
        });
        self
    }

    /// Ordinals of the bindings this one cancels.
    pub fn cancelled_indices(&self) -> Vec<usize> {
        self.cancels.iter().map(|target| target.index).collect()
    }

    /// Re-run the binding periodically while a client is connected.
    pub fn every(mut self, interval: Duration) -> Self {
        self.every = Some(interval);
        self
    }

    /// Legacy status tracker. Has no effect.
    #[deprecated(note = "status trackers have no effect")]
    pub fn status_tracker(mut self) -> Self {
        self.status_tracker = true;
        self
    }
}

/// The result of [`EventListener::listen`].
#[derive(Debug)]
pub enum Bound {
    /// A function was bound.
    Dependency(Dependency),
    /// A decorator was requested.
    Decorator(Decorator),
}

impl Bound {
    /// The bound dependency, or an error if a decorator was requested.
    pub fn into_dependency(self) -> Result<Dependency> {
        match self {
            Self::Dependency(dep) => Ok(dep),
            Self::Decorator(_) => Err(Error::invalid_state(
                "a decorator binding has no dependency until it is applied",
            )),
        }
    }

    /// The decorator, or an error if a function was bound.
    pub fn into_decorator(self) -> Result<Decorator> {
        match self {
            Self::Decorator(decorator) => Ok(decorator),
            Self::Dependency(_) => Err(Error::invalid_state("the binding is already registered")),
        }
    }
}

/// A deferred binding that registers the function it is applied to.
pub struct Decorator {
    listener: EventListener,
    blocks: Arc<Blocks>,
    trigger: Arc<dyn Component>,
    inputs: Inputs,
    outputs: Outputs,
    options: ListenerOptions,
}

impl Decorator {
    /// Register `f` with the stored event, inputs, outputs and options, and
    /// return `f` unchanged.
    pub fn apply(&self, f: EventFn) -> Result<EventFn> {
        self.listener.listen(
            &self.blocks,
            &self.trigger,
            f.clone(),
            self.inputs.clone(),
            self.outputs.clone(),
            self.options.clone(),
        )?;
        Ok(f)
    }
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("event", &self.listener.name())
            .field("trigger", &self.trigger.object_id())
            .finish_non_exhaustive()
    }
}

impl EventListener {
    /// Bind `handler` to this event on `trigger`.
    ///
    /// Registers the binding with `blocks`, registers a hidden cancel binding
    /// when `options.cancels` is non-empty, and runs this kind's activation
    /// hook on the trigger. With [`Handler::Decorator`] nothing is registered
    /// yet; the returned [`Decorator`] registers the function it is applied
    /// to with the same arguments.
    pub fn listen(
        &self,
        blocks: &Arc<Blocks>,
        trigger: &Arc<dyn Component>,
        handler: impl Into<Handler>,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Bound> {
        let inputs = inputs.into();
        let outputs = outputs.into();
        let func = match handler.into() {
            Handler::Function(func) => func,
            Handler::Decorator => {
                return Ok(Bound::Decorator(Decorator {
                    listener: *self,
                    blocks: blocks.clone(),
                    trigger: trigger.clone(),
                    inputs,
                    outputs,
                    options,
                }));
            }
        };

        if options.status_tracker {
            warn_deprecation(deprecation::STATUS_TRACKER);
        }
        if self.name == Events::STOP.name {
            warn_deprecation(deprecation::STOP_EVENT);
        }
        if trigger.declares_event(Events::STREAM.name) {
            trigger.check_streamable()?;
        }
        let cancels = options
            .cancels
            .iter()
            .map(|target| target.resolve(blocks))
            .collect::<Result<Vec<_>>>()?;

        let spec = EventTrigger {
            event: self.name.to_string(),
            inputs: inputs.into_vec(),
            outputs: outputs.into_vec(),
            api_name: options.api_name,
            scroll_to_output: options.scroll_to_output,
            show_progress: options
                .show_progress
                .or(self.show_progress)
                .unwrap_or_default(),
            queue: options.queue,
            batch: options.batch,
            max_batch_size: options.max_batch_size,
            preprocess: options.preprocess,
            postprocess: options.postprocess,
            cancels: Vec::new(),
            every: options.every,
            trigger_after: self.trigger_after,
            trigger_only_on_success: self.trigger_only_on_success,
        };
        let (record, index) = blocks.set_event_trigger(trigger.object_id(), Some(func.clone()), spec)?;
        tracing::debug!(
            target: targets::EVENTS,
            event = self.name,
            index,
            trigger = ?trigger.object_id(),
            "bound event listener"
        );

        self.set_cancel_events(blocks, trigger.object_id(), cancels)?;
        if let Some(callback) = self.callback {
            callback(trigger.as_ref());
        }

        Ok(Bound::Dependency(Dependency::new(
            blocks.clone(),
            trigger.clone(),
            record,
            index,
            func,
        )))
    }

    /// Register the hidden binding that cancels `cancels` when this event fires.
    fn set_cancel_events(
        &self,
        blocks: &Arc<Blocks>,
        trigger: ObjectId,
        cancels: Vec<usize>,
    ) -> Result<()> {
        if cancels.is_empty() {
            return Ok(());
        }
        let weak: Weak<Blocks> = Arc::downgrade(blocks);
        let cancelled = cancels.clone();
        let cancel_fn = EventFn::new(move |_| {
            if let Some(blocks) = weak.upgrade() {
                blocks.request_cancel(&cancelled);
            }
            Ok(Vec::new())
        })
        .named("cancel");

        let mut spec = EventTrigger::new(self.name);
        spec.api_name = ApiName::Hidden;
        spec.queue = Some(false);
        spec.preprocess = false;
        spec.postprocess = false;
        spec.cancels = cancels;
        let (_, index) = blocks.set_event_trigger(trigger, Some(cancel_fn), spec)?;
        tracing::debug!(target: targets::EVENTS, event = self.name, index, "registered cancel binding");
        Ok(())
    }
}

/// Event binding methods for shared components.
pub trait EventTarget {
    /// Bind `func` to the catalog event `event` on this component.
    ///
    /// Fails if the event is unknown or not declared by the component.
    fn on(
        &self,
        blocks: &Arc<Blocks>,
        event: &str,
        func: EventFn,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Dependency>;

    /// Like [`on`](Self::on), but return a [`Decorator`] that binds the
    /// function it is later applied to.
    fn on_decorated(
        &self,
        blocks: &Arc<Blocks>,
        event: &str,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Decorator>;
}

impl<C: Component> EventTarget for Arc<C> {
    fn on(
        &self,
        blocks: &Arc<Blocks>,
        event: &str,
        func: EventFn,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Dependency> {
        let trigger: Arc<dyn Component> = self.clone();
        declared_listener(trigger.as_ref(), event)?
            .listen(blocks, &trigger, func, inputs, outputs, options)?
            .into_dependency()
    }

    fn on_decorated(
        &self,
        blocks: &Arc<Blocks>,
        event: &str,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Decorator> {
        let trigger: Arc<dyn Component> = self.clone();
        declared_listener(trigger.as_ref(), event)?
            .listen(blocks, &trigger, Handler::Decorator, inputs, outputs, options)?
            .into_decorator()
    }
}

fn declared_listener(component: &dyn Component, event: &str) -> Result<&'static EventListener> {
    let listener = Events::get(event).ok_or_else(|| {
        Error::invalid_configuration("event", format!("unknown event `{event}`"))
    })?;
    if !component.declares_event(event) {
        return Err(Error::invalid_configuration(
            "event",
            format!(
                "`{}` does not support the `{event}` event",
                component.component_name()
            ),
        ));
    }
    Ok(listener)
}
