//! # hookbus
//!
//! A namespaced, priority-ordered event dispatcher with pluggable result
//! strategies, plus reactive values built on top of it.
//!
//! ## Core Concepts
//!
//! - **Dispatcher**: maps event names to registries and parses event strings
//!   such as `"save.draft load"` into names and namespace tags
//! - **Registry**: the ordered callbacks of one event name, sorted by
//!   priority (lower first, FIFO among equals)
//! - **Strategy**: how a registry combines its callbacks' results
//!   (`each`, `reduce`, `all`, `any`, or a custom function)
//! - **Emitter**: gives any type its own lazily created dispatcher
//! - **Observable / Properties**: values that announce their changes
//!
//! ## Usage
//!
//! ```
//! use hookbus::{Callback, Dispatcher, Value};
//!
//! let bus = Dispatcher::new();
//! bus.on("price.tax", Callback::new(|inv| {
//!     let base = inv.arg(0).as_int().unwrap_or(0);
//!     Ok(Value::Int(base + base / 5))
//! }));
//! bus.on("price", Callback::new(|inv| Ok(Value::Int(inv.arg(0).as_int().unwrap_or(0) - 10))));
//!
//! let total = bus.reduce("price", vec![Value::Int(100)]).unwrap();
//! assert_eq!(total, vec![Value::Int(110)]);
//!
//! // Only the callbacks tagged `tax`.
//! let taxed = bus.reduce("price.tax", vec![Value::Int(100)]).unwrap();
//! assert_eq!(taxed, vec![Value::Int(120)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod emitter;
pub mod error;
pub mod namespace;
pub mod reactive;
pub mod registry;
pub mod strategy;
pub mod value;

mod lock;

// Re-export primary types at crate root for convenience
pub use callback::{BoundCallback, Callback, CallbackFn, Invocation};
pub use config::DispatcherConfig;
pub use context::{Context, EventName};
pub use dispatcher::{Dispatcher, ListenOptions, ProcessOptions};
pub use emitter::{Emitter, EventSlot};
pub use error::{HookError, HookResult};
pub use namespace::Namespaces;
pub use reactive::{Observable, Properties, PropertyRef};
pub use registry::{CallbackFilter, Registration, Registry, RunParams, DEFAULT_PRIORITY};
pub use strategy::{BuiltinStrategy, CustomStrategy, Strategy, StrategyFn};
pub use value::Value;
