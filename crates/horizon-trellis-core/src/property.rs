//! Values that report whether a write changed them.
//!
//! A component keeps its mutable state in [`Property`] fields and fires the
//! matching [`Signal`](crate::Signal) only when [`Property::set`] returns
//! `true`.
//!
//! ```
//! use horizon_trellis_core::{Property, Signal};
//!
//! let value = Property::new(0);
//! let value_changed = Signal::<i32>::new();
//!
//! if value.set(5) {
//!     value_changed.emit(5);
//! }
//! assert!(!value.set(5));
//! assert_eq!(value.get(), 5);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// Shared, lockable value with change detection.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Wrap an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Copy of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value`. Returns `false`, leaving the property untouched, if it
    /// equals the current value.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}
