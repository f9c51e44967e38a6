//! Core systems for Horizon Trellis.
//!
//! This crate provides the foundational pieces the Horizon Trellis framework
//! builds its components and event bindings on:
//!
//! - **Object Model**: Stable object identifiers and a process-wide registry
//! - **Signal/Slot System**: Type-safe notification between components
//! - **Property System**: Values with change detection
//! - **Logging**: Tracing targets
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_trellis_core::Signal;
//!
//! let choice_made = Signal::<String>::new();
//! let id = choice_made.connect(|choice| {
//!     assert!(!choice.is_empty());
//! });
//!
//! choice_made.emit("b".to_string());
//! assert!(choice_made.disconnect(id));
//! ```
//!
//! # Property Example
//!
//! ```
//! use horizon_trellis_core::{Property, Signal};
//!
//! struct Selection {
//!     value: Property<Option<String>>,
//!     value_changed: Signal<Option<String>>,
//! }
//!
//! impl Selection {
//!     fn select(&self, choice: &str) {
//!         let new_value = Some(choice.to_string());
//!         if self.value.set(new_value.clone()) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//!
//! let selection = Selection {
//!     value: Property::new(None),
//!     value_changed: Signal::new(),
//! };
//! selection.select("a");
//! assert_eq!(selection.value.get().as_deref(), Some("a"));
//! ```

pub mod logging;
pub mod object;
pub mod property;
pub mod signal;

pub use object::{
    global_registry, init_global_registry, Object, ObjectBase, ObjectError, ObjectId,
    ObjectRegistry, ObjectResult,
};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
