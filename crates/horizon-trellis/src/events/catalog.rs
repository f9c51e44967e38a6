//! The catalog of event kinds.
//!
//! Each event kind is an [`EventListener`] descriptor: a name plus optional
//! behaviour. Most kinds are plain names. A few carry extras:
//!
//! - `select`, `stream` and `like` flip a capability flag on the component
//!   the first time they are bound, so the render layer knows the widget
//!   supports the interaction.
//! - `stream` hides the progress indicator unless the binding asks for one.
//!
//! The synthetic `then` and `success` kinds used for chaining are not in the
//! catalog. They are built per predecessor by [`EventListener::chained`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::component::{Capability, Component};
use crate::error::Error;

/// Progress display while a callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowProgress {
    /// Spinner and timer over the outputs.
    #[default]
    Full,
    /// A minimal progress indicator.
    Minimal,
    /// No progress display.
    Hidden,
}

impl ShowProgress {
    /// The wire name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Minimal => "minimal",
            Self::Hidden => "hidden",
        }
    }
}

/// Legacy boolean form: `true` shows full progress, `false` hides it.
impl From<bool> for ShowProgress {
    fn from(show: bool) -> Self {
        if show { Self::Full } else { Self::Hidden }
    }
}

impl FromStr for ShowProgress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "minimal" => Ok(Self::Minimal),
            "hidden" => Ok(Self::Hidden),
            other => Err(Error::invalid_configuration(
                "show_progress",
                format!("{other}. Please choose from one of: ['full', 'minimal', 'hidden']"),
            )),
        }
    }
}

/// Hook run on the trigger component when its event is bound.
pub type ActivationCallback = fn(&dyn Component);

/// Descriptor of an event kind.
#[derive(Clone, Copy)]
pub struct EventListener {
    pub(crate) name: &'static str,
    pub(crate) show_progress: Option<ShowProgress>,
    pub(crate) callback: Option<ActivationCallback>,
    pub(crate) trigger_after: Option<usize>,
    pub(crate) trigger_only_on_success: bool,
}

impl EventListener {
    /// A plain event kind with no extra behaviour.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            show_progress: None,
            callback: None,
            trigger_after: None,
            trigger_only_on_success: false,
        }
    }

    /// A synthetic kind that fires after the binding with ordinal `after`.
    pub const fn chained(name: &'static str, after: usize, only_on_success: bool) -> Self {
        Self {
            name,
            show_progress: None,
            callback: None,
            trigger_after: Some(after),
            trigger_only_on_success: only_on_success,
        }
    }

    /// Set the progress mode used when a binding does not choose one.
    pub const fn with_show_progress(mut self, show_progress: ShowProgress) -> Self {
        self.show_progress = Some(show_progress);
        self
    }

    /// Set the hook run on the component when this kind is bound.
    pub const fn with_callback(mut self, callback: ActivationCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Event name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default progress mode, if this kind overrides it.
    pub fn show_progress(&self) -> Option<ShowProgress> {
        self.show_progress
    }

    /// Ordinal of the binding this kind fires after.
    pub fn trigger_after(&self) -> Option<usize> {
        self.trigger_after
    }

    /// Whether this kind fires only after a successful predecessor.
    pub fn trigger_only_on_success(&self) -> bool {
        self.trigger_only_on_success
    }

    /// Whether binding this kind runs an activation hook.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("name", &self.name)
            .field("show_progress", &self.show_progress)
            .field("has_callback", &self.callback.is_some())
            .field("trigger_after", &self.trigger_after)
            .field("trigger_only_on_success", &self.trigger_only_on_success)
            .finish()
    }
}

impl fmt::Display for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn mark_selectable(component: &dyn Component) {
    component.capabilities().enable(Capability::Selectable);
}

fn mark_streaming(component: &dyn Component) {
    component.capabilities().enable(Capability::Streaming);
}

fn mark_likeable(component: &dyn Component) {
    component.capabilities().enable(Capability::Likeable);
}

/// The built-in event kinds.
pub struct Events;

impl Events {
    pub const CHANGE: EventListener = EventListener::new("change");
    pub const INPUT: EventListener = EventListener::new("input");
    pub const CLICK: EventListener = EventListener::new("click");
    pub const SUBMIT: EventListener = EventListener::new("submit");
    pub const EDIT: EventListener = EventListener::new("edit");
    pub const CLEAR: EventListener = EventListener::new("clear");
    pub const PLAY: EventListener = EventListener::new("play");
    pub const PAUSE: EventListener = EventListener::new("pause");
    /// Deprecated in favour of [`Events::ENDED`].
    pub const STOP: EventListener = EventListener::new("stop");
    pub const END: EventListener = EventListener::new("end");
    pub const ENDED: EventListener = EventListener::new("ended");
    pub const START_RECORDING: EventListener = EventListener::new("start_recording");
    pub const STOP_RECORDING: EventListener = EventListener::new("stop_recording");
    pub const FOCUS: EventListener = EventListener::new("focus");
    pub const BLUR: EventListener = EventListener::new("blur");
    pub const UPLOAD: EventListener = EventListener::new("upload");
    pub const RELEASE: EventListener = EventListener::new("release");
    /// Marks the component `selectable`.
    pub const SELECT: EventListener = EventListener::new("select").with_callback(mark_selectable);
    /// Marks the component `streaming`; progress is hidden by default.
    pub const STREAM: EventListener = EventListener::new("stream")
        .with_show_progress(ShowProgress::Hidden)
        .with_callback(mark_streaming);
    /// Marks the component `likeable`.
    pub const LIKE: EventListener = EventListener::new("like").with_callback(mark_likeable);

    /// Every built-in kind.
    pub const ALL: &'static [EventListener] = &[
        Self::CHANGE,
        Self::INPUT,
        Self::CLICK,
        Self::SUBMIT,
        Self::EDIT,
        Self::CLEAR,
        Self::PLAY,
        Self::PAUSE,
        Self::STOP,
        Self::END,
        Self::ENDED,
        Self::START_RECORDING,
        Self::STOP_RECORDING,
        Self::FOCUS,
        Self::BLUR,
        Self::UPLOAD,
        Self::RELEASE,
        Self::SELECT,
        Self::STREAM,
        Self::LIKE,
    ];

    /// Look up a built-in kind by name.
    pub fn get(name: &str) -> Option<&'static EventListener> {
        CATALOG.get(name)
    }
}

static CATALOG: LazyLock<HashMap<&'static str, EventListener>> =
    LazyLock::new(|| Events::ALL.iter().map(|e| (e.name, *e)).collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Events::get("click").unwrap().name(), "click");
        assert!(Events::get("then").is_none());
        assert!(Events::get("bogus").is_none());
    }

    #[test]
    fn test_catalog_names_unique() {
        assert_eq!(CATALOG.len(), Events::ALL.len());
    }

    #[test]
    fn test_special_kinds() {
        assert!(Events::SELECT.has_callback());
        assert!(Events::LIKE.has_callback());
        assert!(Events::STREAM.has_callback());
        assert_eq!(Events::STREAM.show_progress(), Some(ShowProgress::Hidden));
        assert!(!Events::CHANGE.has_callback());
        assert_eq!(Events::CHANGE.show_progress(), None);
    }

    #[test]
    fn test_chained() {
        let then = EventListener::chained("then", 3, false);
        assert_eq!(then.trigger_after(), Some(3));
        assert!(!then.trigger_only_on_success());

        let success = EventListener::chained("success", 3, true);
        assert!(success.trigger_only_on_success());
    }

    #[test]
    fn test_show_progress_coercion() {
        assert_eq!(ShowProgress::from(true), ShowProgress::Full);
        assert_eq!(ShowProgress::from(false), ShowProgress::Hidden);
        assert_eq!("minimal".parse::<ShowProgress>().unwrap(), ShowProgress::Minimal);
        assert!("loud".parse::<ShowProgress>().is_err());
    }
}
