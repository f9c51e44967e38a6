//! Radio component implementation.
//!
//! This module provides [`Radio`], a group of radio buttons of which exactly
//! one (or none) is selected. Each option is a [`Choice`]: a display label and
//! the value handed to callbacks.
//!
//! # Example
//!
//! ```
//! use horizon_trellis::prelude::*;
//! use serde_json::json;
//!
//! init_global_registry();
//!
//! let radio = Radio::builder()
//!     .with_choices(["a", "b", "c"])
//!     .with_return_type("index")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(radio.preprocess(Some(json!("b"))).unwrap(), Some(json!(1)));
//! assert_eq!(radio.preprocess(Some(json!("z"))).unwrap(), None);
//! ```
//!
//! # Return Modes
//!
//! With [`ReturnMode::Value`] the selected value is passed through unchanged.
//! With [`ReturnMode::Index`] it is replaced by the position of its first
//! occurrence among the configured values, or `None` if it is absent.
//!
//! # Known Quirk
//!
//! [`api_info`](Component::api_info) always reports `{"type": "string"}`, even
//! when every choice is numeric. Consumers generating an API schema from it
//! see numeric radios as string-typed.

use std::fmt;
use std::str::FromStr;

use horizon_trellis_core::logging::targets;
use horizon_trellis_core::{Object, ObjectBase, ObjectId, Property, Signal};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::component::{Capabilities, Component};
use crate::deprecation::{self, warn_deprecation};
use crate::error::{Error, Result};

// =============================================================================
// Choices
// =============================================================================

/// The value of a single choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl ChoiceValue {
    /// Whether a frontend value selects this choice.
    ///
    /// Strings match strings exactly. Numbers match numerically, so `1`
    /// selects a `1.0` choice and vice versa.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Str(s), Value::String(v)) => s == v,
            (Self::Int(i), Value::Number(n)) => match n.as_i64() {
                Some(v) => *i == v,
                None => n.as_f64() == Some(*i as f64),
            },
            (Self::Float(f), Value::Number(n)) => n.as_f64() == Some(*f),
            _ => false,
        }
    }

    /// JSON form of the value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
        }
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write_float(f, *v),
        }
    }
}

/// Float labels: `2.0`, `0.5`, `1e+16`, `1e-05`, `nan`, `inf`.
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("nan");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
    }
    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{v:e}");
        let Some((mantissa, exponent)) = scientific.split_once('e') else {
            return f.write_str(&scientific);
        };
        let exponent: i32 = exponent.parse().unwrap_or_default();
        let sign = if exponent < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exponent.unsigned_abs());
    }
    if v.fract() == 0.0 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

impl From<&str> for ChoiceValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for ChoiceValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ChoiceValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ChoiceValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// One option of a [`Radio`]: a display label and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: ChoiceValue,
}

impl Choice {
    /// A choice with an explicit label.
    pub fn new(label: impl Into<String>, value: impl Into<ChoiceValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A bare value; the label is the value's string form.
impl From<ChoiceValue> for Choice {
    fn from(value: ChoiceValue) -> Self {
        Self {
            label: value.to_string(),
            value,
        }
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        ChoiceValue::from(s).into()
    }
}

impl From<String> for Choice {
    fn from(s: String) -> Self {
        ChoiceValue::from(s).into()
    }
}

impl From<i64> for Choice {
    fn from(i: i64) -> Self {
        ChoiceValue::from(i).into()
    }
}

impl From<i32> for Choice {
    fn from(i: i32) -> Self {
        ChoiceValue::from(i).into()
    }
}

impl From<f64> for Choice {
    fn from(f: f64) -> Self {
        ChoiceValue::from(f).into()
    }
}

/// A `(label, value)` pair.
impl<L: Into<String>, V: Into<ChoiceValue>> From<(L, V)> for Choice {
    fn from((label, value): (L, V)) -> Self {
        Self::new(label, value)
    }
}

fn normalize_choices<I, C>(choices: I) -> Vec<Choice>
where
    I: IntoIterator<Item = C>,
    C: Into<Choice>,
{
    choices.into_iter().map(Into::into).collect()
}

fn choices_json(choices: &[Choice]) -> Value {
    Value::Array(
        choices
            .iter()
            .map(|c| json!([c.label, c.value.to_json()]))
            .collect(),
    )
}

// =============================================================================
// Return mode
// =============================================================================

/// What a [`Radio`] hands to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    /// The selected value.
    #[default]
    Value,
    /// The position of the selected value among the choices.
    Index,
}

impl ReturnMode {
    /// The configuration name of this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Index => "index",
        }
    }
}

impl FromStr for ReturnMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "value" => Ok(Self::Value),
            "index" => Ok(Self::Index),
            other => Err(Error::invalid_configuration(
                "type",
                format!("{other}. Please choose from one of: ['value', 'index']"),
            )),
        }
    }
}

impl fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Radio
// =============================================================================

/// A set of radio buttons of which only one can be selected.
///
/// Create one with [`Radio::builder`]. Binding events to it goes through
/// [`EventTarget`](crate::events::EventTarget) on an `Arc<Radio>` obtained
/// from [`Blocks::add`](crate::Blocks::add).
///
/// # Signals
///
/// - `value_changed(Value)`: emitted when the selected value changes
pub struct Radio {
    base: ObjectBase,
    capabilities: Capabilities,
    choices: Vec<Choice>,
    return_mode: ReturnMode,
    label: Option<String>,
    info: Option<String>,
    show_label: Option<bool>,
    container: bool,
    scale: Option<u32>,
    min_width: u32,
    interactive: Option<bool>,
    visible: bool,
    elem_id: Option<String>,
    elem_classes: Vec<String>,
    value: Property<Value>,

    /// Signal emitted when the selected value changes.
    pub value_changed: Signal<Value>,
}

impl Radio {
    /// Events a radio can trigger.
    pub const EVENTS: &'static [&'static str] = &["select", "change", "input"];

    /// Start building a radio.
    pub fn builder() -> RadioBuilder {
        RadioBuilder::default()
    }

    /// The configured choices, in order.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// The return mode.
    pub fn return_mode(&self) -> ReturnMode {
        self.return_mode
    }

    /// The component label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The extra description shown under the label.
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Minimum width in pixels.
    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    /// Whether the radio is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    // =========================================================================
    // Value
    // =========================================================================

    /// The selected value, or `Value::Null` if nothing is selected.
    pub fn value(&self) -> Value {
        self.value.get()
    }

    /// Select a value, emitting `value_changed` if it differs.
    ///
    /// Returns `true` if the value changed.
    pub fn set_value(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.value.set(value.clone()) {
            tracing::trace!(target: targets::RADIO, id = ?self.object_id(), %value, "value changed");
            self.value_changed.emit(value);
            true
        } else {
            false
        }
    }

    /// Position of the first choice matching `value`.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.choices.iter().position(|c| c.value.matches(value))
    }

    // =========================================================================
    // Legacy update
    // =========================================================================

    /// Build a property update for the render layer.
    ///
    /// Fields left unset in `update` are `null`, except `value`, which is
    /// omitted entirely when unset.
    #[deprecated(note = "return a new `Radio` instead")]
    pub fn update(update: RadioUpdate) -> Map<String, Value> {
        warn_deprecation(deprecation::UPDATE_METHOD);

        let mut map = Map::new();
        map.insert(
            "choices".into(),
            update
                .choices
                .as_deref()
                .map_or(Value::Null, choices_json),
        );
        map.insert("label".into(), json!(update.label));
        map.insert("info".into(), json!(update.info));
        map.insert("show_label".into(), json!(update.show_label));
        map.insert("container".into(), json!(update.container));
        map.insert("scale".into(), json!(update.scale));
        map.insert("min_width".into(), json!(update.min_width));
        map.insert("interactive".into(), json!(update.interactive));
        map.insert("visible".into(), json!(update.visible));
        if let Some(value) = update.value {
            map.insert("value".into(), value);
        }
        map.insert("__type__".into(), Value::String("update".into()));
        map
    }
}

impl Object for Radio {
    fn object_id(&self) -> ObjectId {
        self.base.id()
    }
}

impl Component for Radio {
    fn component_name(&self) -> &'static str {
        "radio"
    }

    fn events(&self) -> &'static [&'static str] {
        Self::EVENTS
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn preprocess(&self, payload: Option<Value>) -> Result<Option<Value>> {
        match self.return_mode {
            ReturnMode::Value => Ok(payload),
            ReturnMode::Index => {
                let Some(selected) = payload.filter(|v| !v.is_null()) else {
                    return Ok(None);
                };
                let index = self.index_of(&selected);
                if index.is_none() {
                    tracing::debug!(
                        target: targets::RADIO,
                        %selected,
                        "selected value is not among the choices"
                    );
                }
                Ok(index.map(Value::from))
            }
        }
    }

    fn example_inputs(&self) -> Option<Value> {
        self.choices.first().map(|c| c.value.to_json())
    }

    fn api_info(&self) -> Value {
        json!({"type": "string"})
    }

    fn config(&self) -> Value {
        json!({
            "choices": choices_json(&self.choices),
            "type": self.return_mode.as_str(),
            "value": self.value(),
            "label": self.label,
            "info": self.info,
            "show_label": self.show_label,
            "container": self.container,
            "scale": self.scale,
            "min_width": self.min_width,
            "interactive": self.interactive,
            "visible": self.visible,
            "elem_id": self.elem_id,
            "elem_classes": self.elem_classes,
            "name": self.component_name(),
        })
    }
}

impl fmt::Debug for Radio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Radio")
            .field("id", &self.object_id())
            .field("choices", &self.choices)
            .field("return_mode", &self.return_mode)
            .field("value", &self.value())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Radio`].
#[derive(Debug, Clone)]
pub struct RadioBuilder {
    choices: Vec<Choice>,
    return_type: String,
    value: Value,
    label: Option<String>,
    info: Option<String>,
    show_label: Option<bool>,
    container: bool,
    scale: Option<u32>,
    min_width: u32,
    interactive: Option<bool>,
    visible: bool,
    elem_id: Option<String>,
    elem_classes: Vec<String>,
}

impl Default for RadioBuilder {
    fn default() -> Self {
        Self {
            choices: Vec::new(),
            return_type: ReturnMode::Value.as_str().to_string(),
            value: Value::Null,
            label: None,
            info: None,
            show_label: None,
            container: true,
            scale: None,
            min_width: 160,
            interactive: None,
            visible: true,
            elem_id: None,
            elem_classes: Vec::new(),
        }
    }
}

impl RadioBuilder {
    /// Set the choices. Bare values get their string form as label.
    pub fn with_choices<I, C>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        self.choices = normalize_choices(choices);
        self
    }

    /// Set the return mode by name: `"value"` or `"index"`.
    ///
    /// Unknown names are rejected by [`build`](Self::build).
    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    /// Set the return mode.
    pub fn with_return_mode(mut self, mode: ReturnMode) -> Self {
        self.return_type = mode.as_str().to_string();
        self
    }

    /// Set the initially selected value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the description shown under the label.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Show or hide the label.
    pub fn with_show_label(mut self, show: bool) -> Self {
        self.show_label = Some(show);
        self
    }

    /// Place the radio in a padded container.
    pub fn with_container(mut self, container: bool) -> Self {
        self.container = container;
        self
    }

    /// Relative width compared to siblings in a row.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Minimum width in pixels.
    pub fn with_min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    /// Whether choices can be selected by the user.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = Some(interactive);
        self
    }

    /// Show or hide the radio.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// DOM id of the rendered element.
    pub fn with_elem_id(mut self, elem_id: impl Into<String>) -> Self {
        self.elem_id = Some(elem_id.into());
        self
    }

    /// DOM classes of the rendered element.
    pub fn with_elem_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elem_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Build the radio.
    ///
    /// Fails with [`Error::InvalidConfiguration`] if the return type is not
    /// `"value"` or `"index"`.
    ///
    /// # Panics
    ///
    /// Panics if the global object registry is not initialized.
    pub fn build(self) -> Result<Radio> {
        let return_mode: ReturnMode = self.return_type.parse()?;
        let radio = Radio {
            base: ObjectBase::new::<Radio>(),
            capabilities: Capabilities::new(),
            choices: self.choices,
            return_mode,
            label: self.label,
            info: self.info,
            show_label: self.show_label,
            container: self.container,
            scale: self.scale,
            min_width: self.min_width,
            interactive: self.interactive,
            visible: self.visible,
            elem_id: self.elem_id,
            elem_classes: self.elem_classes,
            value: Property::new(self.value),
            value_changed: Signal::new(),
        };
        tracing::debug!(
            target: targets::RADIO,
            id = ?radio.object_id(),
            choices = radio.choices.len(),
            mode = %return_mode,
            "created radio"
        );
        Ok(radio)
    }
}

// =============================================================================
// Update
// =============================================================================

/// Fields of a legacy [`Radio::update`] call. Unset fields are left as is.
#[derive(Debug, Clone, Default)]
pub struct RadioUpdate {
    /// New selected value; `Some(Value::Null)` clears the selection.
    pub value: Option<Value>,
    pub choices: Option<Vec<Choice>>,
    pub label: Option<String>,
    pub info: Option<String>,
    pub show_label: Option<bool>,
    pub container: Option<bool>,
    pub scale: Option<u32>,
    pub min_width: Option<u32>,
    pub interactive: Option<bool>,
    pub visible: Option<bool>,
}

impl RadioUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the selected value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Replace the choices.
    pub fn with_choices<I, C>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        self.choices = Some(normalize_choices(choices));
        self
    }

    /// Change the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Show or hide the radio.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Enable or disable user selection.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = Some(interactive);
        self
    }
}
