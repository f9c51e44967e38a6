//! The hosting container and its dependency table.
//!
//! A [`Blocks`] container owns every component added to it and the table of
//! registered bindings ("dependencies"). The table is append-only: a binding
//! receives its ordinal when it is registered, and that ordinal never changes
//! and is never reused. Follow-up bindings refer to their predecessor by this
//! ordinal, and cancel bindings list the ordinals they cancel.
//!
//! Running callbacks is not the container's job. An external scheduler reads
//! the table (directly, or via [`Blocks::dependencies_config`]), decides
//! whether each invocation is queued with [`Blocks::is_queued`], and drains
//! cancellation requests with [`Blocks::take_cancel_requests`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use horizon_trellis_core::logging::targets;
use horizon_trellis_core::{ObjectError, ObjectId, Signal};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};

use crate::component::Component;
use crate::config::BlocksConfig;
use crate::error::{Error, Result};
use crate::events::{ApiName, EventFn, ShowProgress};

/// Everything a binding declares, as handed to [`Blocks::set_event_trigger`].
#[derive(Debug, Clone)]
pub struct EventTrigger {
    /// Name of the event that fires the binding.
    pub event: String,
    /// Components whose values are passed to the callback.
    pub inputs: Vec<ObjectId>,
    /// Components that receive the callback's results.
    pub outputs: Vec<ObjectId>,
    /// How the binding appears in the generated API.
    pub api_name: ApiName,
    /// Scroll to the outputs when the callback completes.
    pub scroll_to_output: bool,
    /// Progress display while the callback runs.
    pub show_progress: ShowProgress,
    /// Queue override; `None` defers to the container default.
    pub queue: Option<bool>,
    /// Whether the callback receives batched inputs.
    pub batch: bool,
    /// Maximum batch size; `None` uses the container default.
    pub max_batch_size: Option<usize>,
    /// Run input preprocessing before the callback.
    pub preprocess: bool,
    /// Run output postprocessing after the callback.
    pub postprocess: bool,
    /// Ordinals this binding cancels when it fires.
    pub cancels: Vec<usize>,
    /// Re-run period while a client is connected.
    pub every: Option<Duration>,
    /// Ordinal of the binding this one runs after.
    pub trigger_after: Option<usize>,
    /// Only run after the predecessor succeeded.
    pub trigger_only_on_success: bool,
}

impl EventTrigger {
    /// A trigger for `event` with every option at its default.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            api_name: ApiName::Unnamed,
            scroll_to_output: false,
            show_progress: ShowProgress::Full,
            queue: None,
            batch: false,
            max_batch_size: None,
            preprocess: true,
            postprocess: true,
            cancels: Vec::new(),
            every: None,
            trigger_after: None,
            trigger_only_on_success: false,
        }
    }
}

/// A registered binding.
///
/// Records are immutable once registered. Cancellation does not modify the
/// targeted record; it is requested through the container.
pub struct DependencyRecord {
    /// Ordinal within the dependency table.
    pub index: usize,
    /// The component whose event fires this binding.
    pub trigger: ObjectId,
    /// Event name.
    pub event: String,
    /// The callback, if the binding has one.
    pub func: Option<EventFn>,
    /// Input component ids, in call order.
    pub inputs: Vec<ObjectId>,
    /// Output component ids, in result order.
    pub outputs: Vec<ObjectId>,
    /// API exposure after name deduplication.
    pub api_name: ApiName,
    pub scroll_to_output: bool,
    pub show_progress: ShowProgress,
    pub queue: Option<bool>,
    pub batch: bool,
    pub max_batch_size: usize,
    pub preprocess: bool,
    pub postprocess: bool,
    pub cancels: Vec<usize>,
    pub every: Option<Duration>,
    pub trigger_after: Option<usize>,
    pub trigger_only_on_success: bool,
}

impl DependencyRecord {
    /// Render-layer representation of this record.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.index,
            "targets": [[self.trigger.as_raw(), self.event]],
            "inputs": self.inputs.iter().map(|id| id.as_raw()).collect::<Vec<_>>(),
            "outputs": self.outputs.iter().map(|id| id.as_raw()).collect::<Vec<_>>(),
            "backend_fn": self.func.is_some(),
            "fn_name": self.func.as_ref().and_then(EventFn::name),
            "api_name": self.api_name.to_json(),
            "scroll_to_output": self.scroll_to_output,
            "show_progress": self.show_progress.as_str(),
            "queue": self.queue,
            "batch": self.batch,
            "max_batch_size": self.max_batch_size,
            "preprocess": self.preprocess,
            "postprocess": self.postprocess,
            "cancels": self.cancels,
            "every": self.every.map(|d| d.as_secs_f64()),
            "trigger_after": self.trigger_after,
            "trigger_only_on_success": self.trigger_only_on_success,
        })
    }
}

impl fmt::Debug for DependencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyRecord")
            .field("index", &self.index)
            .field("trigger", &self.trigger)
            .field("event", &self.event)
            .field("api_name", &self.api_name)
            .field("cancels", &self.cancels)
            .field("trigger_after", &self.trigger_after)
            .field("trigger_only_on_success", &self.trigger_only_on_success)
            .finish_non_exhaustive()
    }
}

/// The hosting container for components and their bindings.
pub struct Blocks {
    config: RwLock<BlocksConfig>,
    components: RwLock<HashMap<ObjectId, Arc<dyn Component>>>,
    dependencies: RwLock<Vec<Arc<DependencyRecord>>>,
    pending_cancels: Mutex<Vec<usize>>,

    /// Emitted with the ordinal of each newly registered binding.
    pub dependency_added: Signal<usize>,

    /// Emitted with the target ordinals whenever a cancel binding fires.
    pub cancel_requested: Signal<Vec<usize>>,
}

impl Blocks {
    /// Create a container with the given configuration.
    pub fn new(config: BlocksConfig) -> Arc<Self> {
        Arc::new(Self {
            config: RwLock::new(config),
            components: RwLock::new(HashMap::new()),
            dependencies: RwLock::new(Vec::new()),
            pending_cancels: Mutex::new(Vec::new()),
            dependency_added: Signal::new(),
            cancel_requested: Signal::new(),
        })
    }

    /// Create a container with the default configuration.
    pub fn with_defaults() -> Arc<Self> {
        Self::new(BlocksConfig::default())
    }

    /// A snapshot of the current configuration.
    pub fn config(&self) -> BlocksConfig {
        self.config.read().clone()
    }

    /// Queue bindings that do not choose for themselves.
    pub fn enable_queue(&self) {
        self.config.write().queue_enabled = true;
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Take ownership of a component and return a shared handle to it.
    pub fn add<C: Component>(&self, component: C) -> Arc<C> {
        let component = Arc::new(component);
        let shared: Arc<dyn Component> = component.clone();
        self.components
            .write()
            .insert(component.object_id(), shared);
        component
    }

    /// Look up a component by id.
    pub fn component(&self, id: ObjectId) -> Result<Arc<dyn Component>> {
        self.components
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::from(ObjectError::InvalidObjectId))
    }

    /// Number of components in the container.
    pub fn component_count(&self) -> usize {
        self.components.read().len()
    }

    // =========================================================================
    // Dependency table
    // =========================================================================

    /// Register a binding and return it with its ordinal.
    ///
    /// Ordinals are assigned in registration order under a single write lock,
    /// so they are dense, monotonic, and never reused.
    #[tracing::instrument(skip(self, func, trigger_spec), target = "horizon_trellis::blocks", level = "debug", fields(event = %trigger_spec.event))]
    pub fn set_event_trigger(
        &self,
        trigger: ObjectId,
        func: Option<EventFn>,
        trigger_spec: EventTrigger,
    ) -> Result<(Arc<DependencyRecord>, usize)> {
        if let Some(every) = trigger_spec.every {
            if every.is_zero() {
                return Err(Error::invalid_configuration(
                    "every",
                    "must be a positive interval or unset",
                ));
            }
            if trigger_spec.queue == Some(false) {
                return Err(Error::invalid_configuration(
                    "every",
                    "periodic bindings require the queue; remove `queue = false`",
                ));
            }
        }
        if trigger_spec.max_batch_size == Some(0) {
            return Err(Error::invalid_configuration(
                "max_batch_size",
                "must be at least 1",
            ));
        }
        let default_batch_size = self.config.read().default_max_batch_size;

        let mut dependencies = self.dependencies.write();
        let index = dependencies.len();
        if let Some(&bad) = trigger_spec.cancels.iter().find(|&&target| target >= index) {
            return Err(Error::invalid_configuration(
                "cancels",
                format!("no registered binding with ordinal {bad}"),
            ));
        }
        let api_name = dedupe_api_name(&dependencies, trigger_spec.api_name);

        let record = Arc::new(DependencyRecord {
            index,
            trigger,
            event: trigger_spec.event,
            func,
            inputs: trigger_spec.inputs,
            outputs: trigger_spec.outputs,
            api_name,
            scroll_to_output: trigger_spec.scroll_to_output,
            show_progress: trigger_spec.show_progress,
            queue: trigger_spec.queue,
            batch: trigger_spec.batch,
            max_batch_size: trigger_spec.max_batch_size.unwrap_or(default_batch_size),
            preprocess: trigger_spec.preprocess,
            postprocess: trigger_spec.postprocess,
            cancels: trigger_spec.cancels,
            every: trigger_spec.every,
            trigger_after: trigger_spec.trigger_after,
            trigger_only_on_success: trigger_spec.trigger_only_on_success,
        });
        dependencies.push(record.clone());
        drop(dependencies);

        tracing::debug!(
            target: targets::BLOCKS,
            index,
            event = %record.event,
            api_name = ?record.api_name,
            "registered dependency"
        );
        self.dependency_added.emit(index);
        Ok((record, index))
    }

    /// Get a registered binding by ordinal.
    pub fn dependency(&self, index: usize) -> Option<Arc<DependencyRecord>> {
        self.dependencies.read().get(index).cloned()
    }

    /// Number of registered bindings.
    pub fn dependency_count(&self) -> usize {
        self.dependencies.read().len()
    }

    /// Snapshot of the whole dependency table, in ordinal order.
    pub fn dependencies(&self) -> Vec<Arc<DependencyRecord>> {
        self.dependencies.read().clone()
    }

    /// Whether invocations of a binding go through the queue.
    pub fn is_queued(&self, record: &DependencyRecord) -> bool {
        record.queue.unwrap_or(self.config.read().queue_enabled)
    }

    /// Check the table for bindings the scheduler could not honour.
    ///
    /// Periodic bindings need the queue; one that defers to the container
    /// default while the queue is disabled is reported here.
    pub fn validate(&self) -> Result<()> {
        let dependencies = self.dependencies.read();
        match dependencies
            .iter()
            .find(|dep| dep.every.is_some() && !self.is_queued(dep))
        {
            Some(dep) => Err(Error::invalid_configuration(
                "every",
                format!(
                    "binding {} runs periodically but the queue is not enabled",
                    dep.index
                ),
            )),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Cancellation
    // =========================================================================

    /// Ask the scheduler to cancel the given bindings.
    ///
    /// Cancellation is cooperative: invocations that have not started, or
    /// that are still producing values, are stopped; running ones finish.
    pub fn request_cancel(&self, targets: &[usize]) {
        if targets.is_empty() {
            return;
        }
        tracing::debug!(target: targets::BLOCKS, ?targets, "cancellation requested");
        self.pending_cancels.lock().extend_from_slice(targets);
        self.cancel_requested.emit(targets.to_vec());
    }

    /// Drain pending cancellation requests, oldest first.
    pub fn take_cancel_requests(&self) -> Vec<usize> {
        std::mem::take(&mut *self.pending_cancels.lock())
    }

    // =========================================================================
    // Render-layer export
    // =========================================================================

    /// The dependency table as the JSON list consumed by the render layer.
    pub fn dependencies_config(&self) -> Value {
        let show_api = self.config.read().show_api;
        let mut deps: Vec<Value> = self
            .dependencies
            .read()
            .iter()
            .map(|dep| dep.to_json())
            .collect();
        if !show_api {
            for dep in &mut deps {
                dep["api_name"] = Value::Bool(false);
            }
        }
        Value::Array(deps)
    }

    /// Every component's render-layer configuration, keyed by raw id.
    pub fn components_config(&self) -> Value {
        let components = self.components.read();
        let mut ids: Vec<&ObjectId> = components.keys().collect();
        ids.sort_by_key(|id| id.as_raw());
        Value::Array(
            ids.into_iter()
                .map(|id| {
                    let component = &components[id];
                    json!({
                        "id": id.as_raw(),
                        "type": component.component_name(),
                        "props": component.config(),
                        "capabilities": component.capabilities().to_json(),
                    })
                })
                .collect(),
        )
    }
}

fn dedupe_api_name(existing: &[Arc<DependencyRecord>], requested: ApiName) -> ApiName {
    let name = match requested {
        ApiName::Named(name) => name,
        other => return other,
    };
    let taken: HashSet<&str> = existing
        .iter()
        .filter_map(|dep| dep.api_name.name())
        .collect();
    if !taken.contains(name.as_str()) {
        return ApiName::Named(name);
    }
    let unique = (1..)
        .map(|n| format!("{name}_{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| name.clone());
    tracing::warn!(
        target: targets::BLOCKS,
        "api_name {name} already exists, using {unique}"
    );
    ApiName::Named(unique)
}

static_assertions::assert_impl_all!(Blocks: Send, Sync);

impl fmt::Debug for Blocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocks")
            .field("config", &*self.config.read())
            .field("components", &self.component_count())
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}
