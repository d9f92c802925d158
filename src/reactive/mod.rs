//! Reactive values built on the dispatcher.
//!
//! [`Observable`] is a single shared value that emits `"change"`;
//! [`Properties`] is a keyed bag of observables that re-broadcasts their
//! changes under per-key event names.

pub mod observable;
pub mod properties;

pub use observable::{Observable, CHANGE};
pub use properties::{Properties, PropertyRef};
