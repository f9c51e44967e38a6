//! Event kinds, event binding, and event payloads.
//!
//! - [`catalog`]: the built-in event kinds ([`Events`]) and their descriptor
//!   type ([`EventListener`]).
//! - [`listener`]: binding a callback to an event ([`EventListener::listen`],
//!   [`EventTarget`]) and the options it accepts.
//! - [`dependency`]: the [`Dependency`] handle returned for each binding,
//!   with `then`/`success` chaining.
//! - [`data`]: payloads passed to callbacks ([`SelectData`], [`LikeData`]).

pub mod catalog;
pub mod data;
pub mod dependency;
pub mod listener;

pub use catalog::{ActivationCallback, EventListener, Events, ShowProgress};
pub use data::{EventData, LikeData, SelectData, SelectionIndex};
pub use dependency::Dependency;
pub use listener::{
    ApiName, Bound, Decorator, EventFn, EventTarget, Handler, Inputs, ListenerOptions, Outputs,
};
