//! Event capability for arbitrary types.
//!
//! A type becomes an event source by owning an [`EventSlot`] and
//! implementing [`Emitter::events`]. The slot creates the dispatcher on first
//! use, with the owner's context as the default invocation context, and the
//! provided trait methods delegate to it.
//!
//! ```
//! use hookbus::{Callback, Context, Dispatcher, Emitter, EventSlot, Value};
//!
//! struct Door {
//!     events: EventSlot,
//! }
//!
//! impl Emitter for Door {
//!     fn events(&self) -> &Dispatcher {
//!         self.events.get_or_init(|| Context::new("door"))
//!     }
//! }
//!
//! let door = Door { events: EventSlot::new() };
//! door.on("open", Callback::action(|_| {}));
//! door.emit("open", vec![Value::Null]).unwrap();
//! ```

use std::sync::OnceLock;

use crate::callback::Callback;
use crate::context::Context;
use crate::dispatcher::{Dispatcher, ListenOptions};
use crate::error::HookResult;
use crate::strategy::Strategy;
use crate::value::Value;

/// Lazily created, cached dispatcher owned by an event source.
#[derive(Debug, Default)]
pub struct EventSlot {
    cell: OnceLock<Dispatcher>,
}

impl EventSlot {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new() -> Self {
        Self { cell: OnceLock::new() }
    }

    /// The dispatcher, created with `context()` as its default context on
    /// first call.
    pub fn get_or_init(&self, context: impl FnOnce() -> Context) -> &Dispatcher {
        self.cell.get_or_init(|| Dispatcher::with_context(context()))
    }

    /// The dispatcher if it has been created. No listener can exist before.
    #[must_use]
    pub fn get(&self) -> Option<&Dispatcher> {
        self.cell.get()
    }
}

/// Dispatcher-backed event capability.
pub trait Emitter {
    /// The dispatcher backing this source.
    fn events(&self) -> &Dispatcher;

    #[allow(missing_docs)]
    fn on(&self, events: &str, callback: Callback) -> &Self
    where
        Self: Sized,
    {
        self.events().on(events, callback);
        self
    }

    #[allow(missing_docs)]
    fn on_with(&self, events: &str, callback: Callback, options: ListenOptions) -> &Self
    where
        Self: Sized,
    {
        self.events().on_with(events, callback, options);
        self
    }

    #[allow(missing_docs)]
    fn once(&self, events: &str, callback: Callback) -> &Self
    where
        Self: Sized,
    {
        self.events().once(events, callback);
        self
    }

    #[allow(missing_docs)]
    fn off(&self, events: &str) -> &Self
    where
        Self: Sized,
    {
        self.events().off(events);
        self
    }

    #[allow(missing_docs)]
    fn off_callback(&self, events: &str, callback: &Callback) -> &Self
    where
        Self: Sized,
    {
        self.events().off_callback(events, callback);
        self
    }

    #[allow(missing_docs)]
    fn trigger(
        &self,
        events: &str,
        strategy: Strategy,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.events().trigger(events, strategy, args)
    }

    #[allow(missing_docs)]
    fn trigger_with(
        &self,
        context: Context,
        events: &str,
        strategy: Strategy,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.events().trigger_with(context, events, strategy, args)
    }

    /// Triggers with the dispatcher's default strategy.
    fn emit(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.events().emit(events, args)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    struct Widget {
        name: &'static str,
        events: EventSlot,
    }

    impl Emitter for Widget {
        fn events(&self) -> &Dispatcher {
            self.events.get_or_init(|| Context::new(self.name))
        }
    }

    #[test]
    fn test_slot_is_lazy_and_cached() {
        let w = Widget {
            name: "w",
            events: EventSlot::new(),
        };
        assert!(w.events.get().is_none());
        let first = w.events() as *const Dispatcher;
        let second = w.events() as *const Dispatcher;
        assert_eq!(first, second);
        assert!(w.events.get().is_some());
    }

    #[test]
    fn test_owner_is_default_context() {
        let w = Widget {
            name: "widget",
            events: EventSlot::new(),
        };
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        w.on(
            "poke",
            Callback::action(move |inv| {
                *sink.lock().unwrap() = inv.context.downcast_ref::<&'static str>().copied();
            }),
        );
        w.emit("poke", Vec::new()).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some("widget"));
    }

    #[test]
    fn test_once_off_and_trigger_delegate() {
        let w = Widget {
            name: "w",
            events: EventSlot::new(),
        };
        let cb = Callback::new(|_| Ok(Value::Bool(true)));
        w.once("check", Callback::new(|_| Ok(Value::Int(0))))
            .on("check", cb.clone());
        assert_eq!(
            w.trigger("check", Strategy::ALL, Vec::new()).unwrap(),
            vec![Value::Bool(false)]
        );
        assert_eq!(w.trigger("check", Strategy::ALL, Vec::new()).unwrap(), vec![Value::Bool(true)]);
        w.off_callback("check", &cb);
        assert_eq!(w.events().callback_count("check"), 0);
        w.on("check", cb).off("check");
        assert_eq!(w.events().callback_count("check"), 0);
    }
}
