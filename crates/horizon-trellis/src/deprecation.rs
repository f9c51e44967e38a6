//! Non-fatal deprecation warnings.
//!
//! Legacy call patterns keep working but log a warning on the
//! [`targets::DEPRECATION`] target. Filter on that target to silence them or
//! to turn them into hard failures in CI.

use horizon_trellis_core::logging::targets;

/// Message for the legacy `status_tracker` binding option.
pub const STATUS_TRACKER: &str =
    "The 'status_tracker' parameter has been deprecated and has no effect.";

/// Message for binding the `stop` event.
pub const STOP_EVENT: &str = "The `stop` event on Video and Audio has been deprecated and will be removed in a future version. Use `ended` instead.";

/// Message for the legacy `Radio::update` call.
pub const UPDATE_METHOD: &str = "Using the update method is deprecated. Simply return a new object instead, e.g. `Radio::builder()...build()` instead of `Radio::update(...)`.";

/// Emit a deprecation warning and continue.
pub fn warn_deprecation(message: &str) {
    tracing::warn!(target: targets::DEPRECATION, "{message}");
}
