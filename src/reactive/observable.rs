//! Observable value with change events.
//!
//! # Design
//!
//! [`Observable`] wraps a [`Value`] in shared, reference-counted storage and
//! owns a private [`Dispatcher`]. A `set` that changes the value (by
//! [`Value::same_value`], so NaN equals NaN) emits `"change"` with
//! `[new, old]`; setting an equal value is a no-op.
//!
//! Propagation is built from plain event subscriptions: `pull` subscribes
//! this observable's setter to a source's `"change"`, `sync` pulls both
//! ways. Cycles terminate because the echoed value is equal to the stored
//! one. A setter whose observable has been dropped detaches itself from
//! the source the next time that source changes.
//!
//! # Failure Modes
//!
//! - A listener error aborts the remaining listeners and is returned from
//!   `set`; the new value is already stored at that point.

use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use crate::callback::{Callback, WeakCallback};
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::emitter::{Emitter, EventSlot};
use crate::error::HookResult;
use crate::lock;
use crate::value::Value;

/// Event emitted by a value-changing `set`.
pub const CHANGE: &str = "change";

struct ObservableInner {
    value: RwLock<Value>,
    events: EventSlot,
    /// The setter subscribed to sources by `pull`; one identity per
    /// observable so `unpull` can find it again.
    setter: OnceLock<Callback>,
}

/// Default context of an observable's dispatcher. Weak, so the dispatcher
/// does not keep its owner alive.
struct ObservableRef(Weak<ObservableInner>);

/// A shared value that announces its changes.
///
/// Cloning an `Observable` creates a new handle to the same value and the
/// same listeners.
#[derive(Clone)]
pub struct Observable {
    inner: Arc<ObservableInner>,
}

impl Observable {
    /// Creates an observable holding `value`.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                value: RwLock::new(value.into()),
                events: EventSlot::new(),
                setter: OnceLock::new(),
            }),
        }
    }

    /// Creates an observable holding `Null`.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Value::Null)
    }

    /// Recovers the observable whose listeners run under `context`.
    #[must_use]
    pub fn from_context(context: &Context) -> Option<Self> {
        let weak = context.downcast_ref::<ObservableRef>()?;
        weak.0.upgrade().map(|inner| Self { inner })
    }

    /// A clone of the current value.
    #[must_use]
    pub fn get(&self) -> Value {
        lock::read(&self.inner.value).clone()
    }

    /// Stores `value` without comparing or notifying.
    pub fn update(&self, value: impl Into<Value>) -> &Self {
        *lock::write(&self.inner.value) = value.into();
        self
    }

    /// Stores `value` and emits `"change"` with `[new, old]` if it differs
    /// from the current value.
    pub fn set(&self, value: impl Into<Value>) -> HookResult<()> {
        let value = value.into();
        let from = {
            let mut current = lock::write(&self.inner.value);
            if current.same_value(&value) {
                return Ok(());
            }
            std::mem::replace(&mut *current, value.clone())
        };

        // Nobody can be listening before the dispatcher exists.
        let Some(events) = self.inner.events.get() else {
            return Ok(());
        };
        events.each(CHANGE, vec![value, from])?;
        Ok(())
    }

    /// Identity comparison.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn setter(&self) -> Callback {
        self.inner
            .setter
            .get_or_init(|| {
                let weak = Arc::downgrade(&self.inner);
                let slot: Arc<OnceLock<WeakCallback>> = Arc::new(OnceLock::new());
                let own = Arc::clone(&slot);
                let setter = Callback::new(move |inv| {
                    if let Some(inner) = weak.upgrade() {
                        Observable { inner }.set(inv.arg(0))?;
                        return Ok(Value::Null);
                    }
                    // Dead puller: detach from the source that fired.
                    let me = own.get().and_then(WeakCallback::upgrade);
                    if let (Some(source), Some(me)) = (Observable::from_context(inv.context), me) {
                        source.off_callback(CHANGE, &me);
                    }
                    Ok(Value::Null)
                });
                let _ = slot.set(setter.downgrade());
                setter
            })
            .clone()
    }

    /// Tracks every change of each source, one way.
    pub fn pull<'a>(&self, sources: impl IntoIterator<Item = &'a Observable>) -> &Self {
        let setter = self.setter();
        for source in sources {
            source.on(CHANGE, setter.clone());
        }
        self
    }

    /// Stops tracking each source.
    pub fn unpull<'a>(&self, sources: impl IntoIterator<Item = &'a Observable>) -> &Self {
        let setter = self.setter();
        for source in sources {
            source.off_callback(CHANGE, &setter);
        }
        self
    }

    /// Pulls each peer and makes each peer pull this observable.
    pub fn sync<'a>(&self, peers: impl IntoIterator<Item = &'a Observable>) -> &Self {
        for peer in peers {
            self.pull([peer]);
            peer.pull([self]);
        }
        self
    }

    /// Undoes [`Observable::sync`].
    pub fn unsync<'a>(&self, peers: impl IntoIterator<Item = &'a Observable>) -> &Self {
        for peer in peers {
            self.unpull([peer]);
            peer.unpull([self]);
        }
        self
    }
}

impl Emitter for Observable {
    fn events(&self) -> &Dispatcher {
        self.inner
            .events
            .get_or_init(|| Context::new(ObservableRef(Arc::downgrade(&self.inner))))
    }
}

impl Default for Observable {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.get())
            .field(
                "listeners",
                &self.inner.events.get().map_or(0, |d| d.callback_count(CHANGE)),
            )
            .finish()
    }
}
