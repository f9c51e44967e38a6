//! Change notification.
//!
//! A [`Signal`] holds a set of closures and calls each of them, on the
//! emitting thread, when the signal fires. Components use signals to report
//! value changes and capability activation.

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Handle for removing a connected slot.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A list of slots fired together.
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use horizon_trellis_core::Signal;
///
/// let activated = Signal::<&'static str>::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let counter = hits.clone();
/// activated.connect(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
/// activated.emit("select");
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a signal with no slots.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Add a slot.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Remove a slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Call every slot with `args`.
    ///
    /// The slot list is copied out first, so a slot may connect to or
    /// disconnect from this signal while it runs.
    #[tracing::instrument(skip_all, target = "horizon_trellis_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emit");
        for slot in slots {
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
