//! The process-wide default dispatcher.
//!
//! Created on first use and shared for the life of the process. The free
//! functions mirror the familiar action/filter hook vocabulary: actions are
//! run for their side effects, filters fold a value through every callback.

use std::sync::OnceLock;

use crate::callback::Callback;
use crate::error::HookResult;
use crate::value::Value;

use super::Dispatcher;

static DEFAULT: OnceLock<Dispatcher> = OnceLock::new();

/// The process-wide dispatcher.
pub fn dispatcher() -> &'static Dispatcher {
    DEFAULT.get_or_init(|| {
        tracing::debug!("initializing process-wide dispatcher");
        Dispatcher::new()
    })
}

/// Registers an action callback. Same as `on`.
pub fn add_action(events: &str, callback: Callback) -> &'static Dispatcher {
    dispatcher().on(events, callback)
}

/// Registers a filter callback. Same as `on`.
pub fn add_filter(events: &str, callback: Callback) -> &'static Dispatcher {
    dispatcher().on(events, callback)
}

/// Removes actions; narrowed to `callback` when given. Same as `off`.
pub fn remove_action(events: &str, callback: Option<&Callback>) -> &'static Dispatcher {
    match callback {
        Some(cb) => dispatcher().off_callback(events, cb),
        None => dispatcher().off(events),
    }
}

/// Removes filters; narrowed to `callback` when given. Same as `off`.
pub fn remove_filter(events: &str, callback: Option<&Callback>) -> &'static Dispatcher {
    remove_action(events, callback)
}

/// Runs every matching action.
pub fn do_action(events: &str, args: Vec<Value>) -> HookResult<()> {
    dispatcher().action(events, args).map(drop)
}

/// Folds `args[0]` through every matching filter; one result per event.
pub fn apply_filters(events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
    dispatcher().filter(events, args)
}
