//! The component contract shared by every widget.
//!
//! A [`Component`] is any object that can appear as the trigger, input, or
//! output of an event binding. The binder relies on three things from it:
//! the list of events it declares, its [`Capabilities`] flags, and the
//! [`check_streamable`](Component::check_streamable) validation hook.
//! Everything else on the trait exists for the external scheduler and render
//! layer, which pass values through `preprocess`/`postprocess` around each
//! callback and read `config`/`api_info` when building the page and the API
//! description.

use horizon_trellis_core::{Object, Property, Signal};
use serde_json::Value;

use crate::error::Result;

/// An interaction a component can be marked as supporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The component reports item selections (`select` event).
    Selectable,
    /// The component streams values (`stream` event).
    Streaming,
    /// The component reports like/dislike feedback (`like` event).
    Likeable,
}

impl Capability {
    /// The flag name read by the render layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selectable => "selectable",
            Self::Streaming => "streaming",
            Self::Likeable => "likeable",
        }
    }
}

/// Capability flags of a single component.
///
/// Flags start cleared and are only ever set, by the event binder, the first
/// time the matching event is bound. Setting a flag that is already set is a
/// no-op, so `activated` fires at most once per capability.
#[derive(Default)]
pub struct Capabilities {
    selectable: Property<bool>,
    streaming: Property<bool>,
    likeable: Property<bool>,
    /// Emitted when a capability is enabled for the first time.
    pub activated: Signal<Capability>,
}

impl Capabilities {
    /// Create a set of cleared flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable a capability, returning `true` if it was not already enabled.
    pub fn enable(&self, capability: Capability) -> bool {
        let changed = self.flag(capability).set(true);
        if changed {
            self.activated.emit(capability);
        }
        changed
    }

    /// Check whether a capability is enabled.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.flag(capability).get()
    }

    /// Whether the component reports selections.
    pub fn selectable(&self) -> bool {
        self.selectable.get()
    }

    /// Whether the component streams values.
    pub fn streaming(&self) -> bool {
        self.streaming.get()
    }

    /// Whether the component reports likes.
    pub fn likeable(&self) -> bool {
        self.likeable.get()
    }

    /// Flags as a JSON object for the render layer.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "selectable": self.selectable(),
            "streaming": self.streaming(),
            "likeable": self.likeable(),
        })
    }

    fn flag(&self, capability: Capability) -> &Property<bool> {
        match capability {
            Capability::Selectable => &self.selectable,
            Capability::Streaming => &self.streaming,
            Capability::Likeable => &self.likeable,
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("selectable", &self.selectable())
            .field("streaming", &self.streaming())
            .field("likeable", &self.likeable())
            .finish()
    }
}

/// A widget that can take part in event bindings.
pub trait Component: Object {
    /// Short component kind used by the render layer, e.g. `"radio"`.
    fn component_name(&self) -> &'static str;

    /// Names of the events this component can trigger.
    fn events(&self) -> &'static [&'static str];

    /// The component's capability flags.
    fn capabilities(&self) -> &Capabilities;

    /// Validate that the component can act as a streaming source.
    ///
    /// Called by the binder before registering any binding on a component
    /// that declares the `stream` event.
    fn check_streamable(&self) -> Result<()> {
        Ok(())
    }

    /// Convert a frontend value into the value handed to a callback.
    fn preprocess(&self, payload: Option<Value>) -> Result<Option<Value>> {
        Ok(payload)
    }

    /// Convert a callback's return value into the value sent to the frontend.
    fn postprocess(&self, value: Option<Value>) -> Result<Option<Value>> {
        Ok(value)
    }

    /// An example input value, used by generated API documentation.
    fn example_inputs(&self) -> Option<Value> {
        None
    }

    /// JSON schema fragment describing this component's value.
    fn api_info(&self) -> Value;

    /// Render-layer configuration for this component.
    fn config(&self) -> Value;

    /// Whether `event` is among the declared events.
    fn declares_event(&self, event: &str) -> bool {
        self.events().contains(&event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_flags_start_cleared() {
        let caps = Capabilities::new();
        assert!(!caps.selectable());
        assert!(!caps.streaming());
        assert!(!caps.likeable());
    }

    #[test]
    fn test_enable_is_idempotent() {
        let caps = Capabilities::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        caps.activated.connect(move |_| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(caps.enable(Capability::Likeable));
        assert!(!caps.enable(Capability::Likeable));
        assert!(caps.is_enabled(Capability::Likeable));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_to_json() {
        let caps = Capabilities::new();
        caps.enable(Capability::Streaming);
        assert_eq!(
            caps.to_json(),
            serde_json::json!({"selectable": false, "streaming": true, "likeable": false})
        );
    }
}
