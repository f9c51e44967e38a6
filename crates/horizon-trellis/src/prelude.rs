//! Prelude module for Horizon Trellis.
//!
//! ```
//! use horizon_trellis::prelude::*;
//! ```

// ============================================================================
// Object, Signal and Property System
// ============================================================================

pub use crate::{init_global_registry, ConnectionId, Object, ObjectId, Property, Signal};

// ============================================================================
// Container and Components
// ============================================================================

pub use crate::blocks::Blocks;
pub use crate::component::{Capability, Component};
pub use crate::components::{Choice, Radio, RadioUpdate, ReturnMode};
pub use crate::config::BlocksConfig;

// ============================================================================
// Events
// ============================================================================

pub use crate::events::{
    ApiName, Dependency, EventFn, EventTarget, Events, LikeData, ListenerOptions, SelectData,
    ShowProgress,
};

pub use crate::error::{Error, Result};
