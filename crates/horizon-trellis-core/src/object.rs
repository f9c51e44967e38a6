//! Component identity.
//!
//! Every component owns an [`ObjectBase`], which takes a slot in the global
//! [`ObjectRegistry`] when it is built and gives it back when it is dropped.
//! Bindings name their trigger, inputs and outputs by [`ObjectId`] only, so an
//! id stays fixed while its component is alive and is never handed out again.

use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Identifier of a live component.
    ///
    /// Slot versioning keeps a stale id from aliasing a newer component that
    /// reuses the same slot.
    pub struct ObjectId;
}

impl ObjectId {
    /// Numeric form of the id, as written into exported configuration.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Failure looking up or releasing an object id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// No live object has this id.
    InvalidObjectId,
    /// [`init_global_registry`] has not been called.
    RegistryNotInitialized,
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidObjectId => f.write_str("object id is not registered"),
            Self::RegistryNotInitialized => f.write_str("global object registry is not initialized"),
        }
    }
}

impl std::error::Error for ObjectError {}

/// Result alias for registry operations.
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;

/// Table of live ids, each tagged with its component's type name.
pub struct ObjectRegistry {
    slots: Mutex<SlotMap<ObjectId, &'static str>>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Allocate an id for a new `T`.
    pub fn register<T: Object>(&self) -> ObjectId {
        let type_name = std::any::type_name::<T>();
        let id = self.slots.lock().insert(type_name);
        tracing::trace!(target: targets::OBJECT, ?id, type_name, "registered object");
        id
    }

    /// Release an id.
    pub fn destroy(&self, id: ObjectId) -> ObjectResult<()> {
        let type_name = self
            .slots
            .lock()
            .remove(id)
            .ok_or(ObjectError::InvalidObjectId)?;
        tracing::trace!(target: targets::OBJECT, ?id, type_name, "released object");
        Ok(())
    }

    /// Whether `id` belongs to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots.lock().contains_key(id)
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.slots.lock().len()
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: OnceLock<ObjectRegistry> = OnceLock::new();

/// Set up the process-wide registry. Later calls do nothing.
pub fn init_global_registry() {
    GLOBAL_REGISTRY.get_or_init(ObjectRegistry::new);
}

/// The process-wide registry.
pub fn global_registry() -> ObjectResult<&'static ObjectRegistry> {
    GLOBAL_REGISTRY.get().ok_or(ObjectError::RegistryNotInitialized)
}

/// Anything with a registry identity.
///
/// ```
/// use horizon_trellis_core::{init_global_registry, Object, ObjectBase, ObjectId};
///
/// struct Label {
///     base: ObjectBase,
/// }
///
/// impl Object for Label {
///     fn object_id(&self) -> ObjectId {
///         self.base.id()
///     }
/// }
///
/// init_global_registry();
/// let a = Label { base: ObjectBase::new::<Label>() };
/// let b = Label { base: ObjectBase::new::<Label>() };
/// assert_ne!(a.object_id(), b.object_id());
/// ```
pub trait Object: Any + Send + Sync {
    /// This object's id.
    fn object_id(&self) -> ObjectId;
}

/// Owned registry slot, embedded in each component.
pub struct ObjectBase {
    id: ObjectId,
}

impl ObjectBase {
    /// Take a slot for a new `T`.
    ///
    /// # Panics
    ///
    /// Panics if [`init_global_registry`] has not been called.
    pub fn new<T: Object>() -> Self {
        let registry = global_registry().expect("Global registry not initialized");
        Self {
            id: registry.register::<T>(),
        }
    }

    /// The slot's id.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        if let Ok(registry) = global_registry() {
            let _ = registry.destroy(self.id);
        }
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase").field("id", &self.id).finish()
    }
}
