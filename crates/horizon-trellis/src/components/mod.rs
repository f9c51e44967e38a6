//! Built-in components.

pub mod radio;

pub use radio::{Choice, ChoiceValue, Radio, RadioBuilder, RadioUpdate, ReturnMode};
