//! Tracing targets.
//!
//! Nothing in Horizon Trellis installs a subscriber. Applications pick one
//! and filter by the targets below:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_trellis=debug,horizon_trellis::deprecation=warn")
//!     .init();
//! ```

/// Target names, one per subsystem.
pub mod targets {
    /// Slot dispatch.
    pub const SIGNAL: &str = "horizon_trellis_core::signal";
    /// Id allocation and release.
    pub const OBJECT: &str = "horizon_trellis_core::object";
    /// Event binding.
    pub const EVENTS: &str = "horizon_trellis::events";
    /// Dependency table.
    pub const BLOCKS: &str = "horizon_trellis::blocks";
    /// Deprecated call patterns.
    pub const DEPRECATION: &str = "horizon_trellis::deprecation";
    /// Radio component.
    pub const RADIO: &str = "horizon_trellis::radio";
}
