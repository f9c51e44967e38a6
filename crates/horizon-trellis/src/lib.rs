//! Horizon Trellis - declarative components and event bindings for
//! server-driven web UIs.
//!
//! Application code builds components, adds them to a [`Blocks`] container,
//! and binds callbacks to their events. Each binding becomes an immutable
//! record in the container's dependency table, which an external scheduler
//! and render layer consume.
//!
//! # Example
//!
//! ```
//! use horizon_trellis::prelude::*;
//! use serde_json::json;
//!
//! init_global_registry();
//! let blocks = Blocks::with_defaults();
//! let size = blocks.add(
//!     Radio::builder()
//!         .with_choices([("Small", 1), ("Large", 2)])
//!         .with_label("Size")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let report = EventFn::new(|args| Ok(vec![json!(format!("picked {}", args[0]))]));
//! let dep = size
//!     .on(&blocks, "select", report, size.object_id(), (), ListenerOptions::new().api_name("pick"))
//!     .unwrap();
//! dep.then(EventFn::new(|_| Ok(vec![])), (), (), ListenerOptions::new()).unwrap();
//!
//! assert!(size.capabilities().selectable());
//! assert_eq!(blocks.dependency(1).unwrap().trigger_after, Some(0));
//! ```

pub mod blocks;
pub mod component;
pub mod components;
pub mod config;
pub mod deprecation;
mod error;
pub mod events;
pub mod prelude;

pub use horizon_trellis_core::*;

pub use blocks::{Blocks, DependencyRecord, EventTrigger};
pub use component::{Capabilities, Capability, Component};
pub use config::BlocksConfig;
pub use error::{Error, Result};
