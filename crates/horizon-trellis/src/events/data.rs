//! Event payloads handed to callbacks.
//!
//! When the frontend fires an event it sends a small JSON payload describing
//! the interaction. The scheduler wraps it in one of these types and passes it
//! to the callback alongside the input values. Payloads are snapshots: they
//! are built at dispatch time and dropped once the callback returns.
//!
//! ```
//! use horizon_trellis::events::{SelectData, SelectionIndex};
//! use serde_json::json;
//!
//! let data = SelectData::new(None, json!({"index": [1, 2], "value": "cell"})).unwrap();
//! assert_eq!(data.index, SelectionIndex::Pair(1, 2));
//! assert!(data.selected);
//! ```

use horizon_trellis_core::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Position of the item an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionIndex {
    /// A position in a one-dimensional component.
    Single(usize),
    /// A `(row, column)` position in a two-dimensional component, or a range.
    Pair(usize, usize),
}

/// Information common to every event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventData {
    target: Option<ObjectId>,
    data: Value,
}

impl EventData {
    /// Wrap a raw payload fired by `target`.
    pub fn new(target: Option<ObjectId>, data: Value) -> Self {
        Self { target, data }
    }

    /// The component that fired the event.
    ///
    /// Distinguishes the source when one callback is bound to several
    /// components.
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// The raw payload.
    pub fn data(&self) -> &Value {
        &self.data
    }
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct SelectPayload {
    index: SelectionIndex,
    value: Value,
    #[serde(default = "default_true")]
    selected: bool,
}

#[derive(Deserialize)]
struct LikePayload {
    index: SelectionIndex,
    value: Value,
    #[serde(default = "default_true")]
    liked: bool,
}

fn parse<T: for<'de> Deserialize<'de>>(data: &Value) -> Result<T> {
    T::deserialize(data).map_err(|e| Error::InvalidPayload(e.to_string()))
}

/// Payload of a `select` event.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectData {
    base: EventData,
    /// Index of the selected item.
    pub index: SelectionIndex,
    /// Value of the selected item.
    pub value: Value,
    /// `true` if the item was selected, `false` if deselected.
    pub selected: bool,
}

impl SelectData {
    /// Parse a `select` payload. `selected` defaults to `true`.
    pub fn new(target: Option<ObjectId>, data: Value) -> Result<Self> {
        let payload: SelectPayload = parse(&data)?;
        Ok(Self {
            base: EventData::new(target, data),
            index: payload.index,
            value: payload.value,
            selected: payload.selected,
        })
    }

    /// The common event information.
    pub fn event(&self) -> &EventData {
        &self.base
    }

    /// The component that fired the event.
    pub fn target(&self) -> Option<ObjectId> {
        self.base.target()
    }

    /// JSON form handed to callbacks.
    pub fn to_value(&self) -> Value {
        json!({
            "target": self.target().map(ObjectId::as_raw),
            "index": self.index,
            "value": self.value,
            "selected": self.selected,
        })
    }
}

/// Payload of a `like` event.
#[derive(Debug, Clone, PartialEq)]
pub struct LikeData {
    base: EventData,
    /// Index of the liked or disliked item.
    pub index: SelectionIndex,
    /// Value of the liked or disliked item.
    pub value: Value,
    /// `true` if the item was liked, `false` if disliked.
    pub liked: bool,
}

impl LikeData {
    /// Parse a `like` payload. `liked` defaults to `true`.
    pub fn new(target: Option<ObjectId>, data: Value) -> Result<Self> {
        let payload: LikePayload = parse(&data)?;
        Ok(Self {
            base: EventData::new(target, data),
            index: payload.index,
            value: payload.value,
            liked: payload.liked,
        })
    }

    /// The common event information.
    pub fn event(&self) -> &EventData {
        &self.base
    }

    /// The component that fired the event.
    pub fn target(&self) -> Option<ObjectId> {
        self.base.target()
    }

    /// JSON form handed to callbacks.
    pub fn to_value(&self) -> Value {
        json!({
            "target": self.target().map(ObjectId::as_raw),
            "index": self.index,
            "value": self.value,
            "liked": self.liked,
        })
    }
}
