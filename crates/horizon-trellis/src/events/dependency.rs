//! The handle returned for a registered binding.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::catalog::EventListener;
use super::listener::{EventFn, Inputs, ListenerOptions, Outputs};
use crate::blocks::{Blocks, DependencyRecord};
use crate::component::Component;
use crate::error::Result;

/// A registered binding.
///
/// The record itself lives in the container's dependency table; the handle
/// only references it. Handles are cheap to clone.
#[derive(Clone)]
pub struct Dependency {
    blocks: Arc<Blocks>,
    trigger: Arc<dyn Component>,
    record: Arc<DependencyRecord>,
    index: usize,
    func: EventFn,
}

impl Dependency {
    pub(crate) fn new(
        blocks: Arc<Blocks>,
        trigger: Arc<dyn Component>,
        record: Arc<DependencyRecord>,
        index: usize,
        func: EventFn,
    ) -> Self {
        Self {
            blocks,
            trigger,
            record,
            index,
            func,
        }
    }

    /// Ordinal of this binding in the container's table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The container holding this binding.
    pub(crate) fn blocks(&self) -> &Arc<Blocks> {
        &self.blocks
    }

    /// The registered record.
    pub fn record(&self) -> &DependencyRecord {
        &self.record
    }

    /// The bound callback.
    pub fn func(&self) -> &EventFn {
        &self.func
    }

    /// Call the bound callback directly, bypassing the scheduler.
    pub fn call(&self, args: &[Value]) -> Result<Vec<Value>> {
        self.func.call(args)
    }

    /// Bind `func` to run after this binding completes, whether it
    /// succeeded or failed.
    pub fn then(
        &self,
        func: EventFn,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Dependency> {
        self.follow_up(EventListener::chained("then", self.index, false), func, inputs, outputs, options)
    }

    /// Bind `func` to run after this binding completes successfully.
    pub fn success(
        &self,
        func: EventFn,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Dependency> {
        self.follow_up(EventListener::chained("success", self.index, true), func, inputs, outputs, options)
    }

    fn follow_up(
        &self,
        listener: EventListener,
        func: EventFn,
        inputs: impl Into<Inputs>,
        outputs: impl Into<Outputs>,
        options: ListenerOptions,
    ) -> Result<Dependency> {
        listener
            .listen(&self.blocks, &self.trigger, func, inputs, outputs, options)?
            .into_dependency()
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("index", &self.index)
            .field("event", &self.record.event)
            .field("trigger", &self.trigger.object_id())
            .field("func", &self.func)
            .finish()
    }
}
