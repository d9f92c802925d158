//! Keyed bag of observables.
//!
//! [`Properties`] maps string keys to [`Observable`]s and re-broadcasts each
//! child's change on itself:
//!
//! | event | args |
//! |-------|------|
//! | `change:<key>` | `[new, old]` |
//! | `change` | `[key, new, old]` |
//! | `add:<key>`, `add` | `[key]` |
//! | `remove:<key>`, `remove` | `[key]` |
//!
//! Keys become part of event names, so they may not contain whitespace or
//! `.`; such keys are rejected with [`HookError::InvalidKey`].
//!
//! The bag only listens to its children; an observable handed to `add`
//! stays usable on its own and keeps its other listeners after `remove`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use crate::callback::{Callback, WeakCallback};
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::emitter::{Emitter, EventSlot};
use crate::error::{HookError, HookResult};
use crate::lock;
use crate::value::Value;

use super::observable::{Observable, CHANGE};

/// A key of the bag or a standalone observable, accepted wherever the bag
/// proxies pull/sync.
#[derive(Debug, Clone)]
pub enum PropertyRef {
    #[allow(missing_docs)]
    Key(String),
    #[allow(missing_docs)]
    Observable(Observable),
}

impl From<&str> for PropertyRef {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PropertyRef {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<Observable> for PropertyRef {
    fn from(observable: Observable) -> Self {
        Self::Observable(observable)
    }
}

impl From<&Observable> for PropertyRef {
    fn from(observable: &Observable) -> Self {
        Self::Observable(observable.clone())
    }
}

struct PropertyEntry {
    observable: Observable,
    /// Registered on the child's `change`; kept to detach it on remove.
    relay: Callback,
}

struct PropertiesInner {
    entries: RwLock<BTreeMap<String, PropertyEntry>>,
    events: EventSlot,
}

/// Default context of a bag's dispatcher.
struct PropertiesRef(Weak<PropertiesInner>);

/// A shared, observable map of named values.
///
/// Cloning a `Properties` yields another handle to the same bag.
#[derive(Clone)]
pub struct Properties {
    inner: Arc<PropertiesInner>,
}

impl Properties {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PropertiesInner {
                entries: RwLock::new(BTreeMap::new()),
                events: EventSlot::new(),
            }),
        }
    }

    /// Creates a bag holding each `(key, value)` pair.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> HookResult<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let props = Self::new();
        props.set_all(pairs)?;
        Ok(props)
    }

    /// Creates a bag with one key per member of a JSON object.
    pub fn from_json(json: serde_json::Value) -> HookResult<Self> {
        let serde_json::Value::Object(members) = json else {
            return Err(HookError::Config {
                message: format!("properties must be built from a JSON object, got {json}"),
            });
        };
        Self::from_pairs(members.into_iter().map(|(k, v)| (k, Value::from_json(v))))
    }

    /// Recovers the bag whose listeners run under `context`.
    #[must_use]
    pub fn from_context(context: &Context) -> Option<Self> {
        let weak = context.downcast_ref::<PropertiesRef>()?;
        weak.0.upgrade().map(|inner| Self { inner })
    }

    /// The observable stored under `key`.
    #[must_use]
    pub fn observable(&self, key: &str) -> Option<Observable> {
        lock::read(&self.inner.entries).get(key).map(|e| e.observable.clone())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        lock::read(&self.inner.entries).contains_key(key)
    }

    /// Keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        lock::read(&self.inner.entries).keys().cloned().collect()
    }

    /// The value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.observable(key).map(|o| o.get())
    }

    /// Adds `key`, backed by `observable` or by a fresh empty one.
    ///
    /// An existing key is never replaced: its observable is returned and
    /// nothing is emitted.
    pub fn add(&self, key: &str, observable: Option<Observable>) -> HookResult<Observable> {
        check_key(key)?;
        let observable = {
            let mut entries = lock::write(&self.inner.entries);
            if let Some(existing) = entries.get(key) {
                return Ok(existing.observable.clone());
            }
            let observable = observable.unwrap_or_default();
            let relay = self.relay(key);
            observable.on(CHANGE, relay.clone());
            entries.insert(
                key.to_string(),
                PropertyEntry {
                    observable: observable.clone(),
                    relay,
                },
            );
            observable
        };

        tracing::trace!(key, "property added");
        self.announce("add", key)?;
        Ok(observable)
    }

    /// Detaches and forgets `key`. Returns its observable, which keeps any
    /// listeners bound to it directly.
    pub fn remove(&self, key: &str) -> HookResult<Option<Observable>> {
        let Some(entry) = lock::write(&self.inner.entries).remove(key) else {
            return Ok(None);
        };
        entry.observable.off_callback(CHANGE, &entry.relay);

        tracing::trace!(key, "property removed");
        self.announce("remove", key)?;
        Ok(Some(entry.observable))
    }

    /// Sets `key`, creating it on first use.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> HookResult<()> {
        let observable = match self.observable(key) {
            Some(existing) => existing,
            None => self.add(key, None)?,
        };
        observable.set(value)
    }

    /// Sets every `(key, value)` pair, in iteration order.
    pub fn set_all<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>) -> HookResult<()>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in pairs {
            let key: String = key.into();
            self.set(&key, value)?;
        }
        Ok(())
    }

    /// Makes `key` track each source. False when `key` is unknown.
    pub fn pull(&self, key: &str, sources: &[PropertyRef]) -> bool {
        self.proxy(key, sources, |target, resolved| {
            target.pull(resolved);
        })
    }

    #[allow(missing_docs)]
    pub fn unpull(&self, key: &str, sources: &[PropertyRef]) -> bool {
        self.proxy(key, sources, |target, resolved| {
            target.unpull(resolved);
        })
    }

    /// Syncs `key` with each peer. False when `key` is unknown.
    pub fn sync(&self, key: &str, peers: &[PropertyRef]) -> bool {
        self.proxy(key, peers, |target, resolved| {
            target.sync(resolved);
        })
    }

    #[allow(missing_docs)]
    pub fn unsync(&self, key: &str, peers: &[PropertyRef]) -> bool {
        self.proxy(key, peers, |target, resolved| {
            target.unsync(resolved);
        })
    }

    /// Resolves `refs` against the bag, skipping unknown keys, and applies
    /// `op` to the observable under `key`.
    fn proxy(
        &self,
        key: &str,
        refs: &[PropertyRef],
        op: impl FnOnce(&Observable, &[Observable]),
    ) -> bool {
        let Some(target) = self.observable(key) else {
            return false;
        };
        let resolved: Vec<Observable> = refs
            .iter()
            .filter_map(|r| match r {
                PropertyRef::Key(k) => self.observable(k),
                PropertyRef::Observable(o) => Some(o.clone()),
            })
            .collect();
        op(&target, &resolved);
        true
    }

    fn relay(&self, key: &str) -> Callback {
        let weak = Arc::downgrade(&self.inner);
        let key = key.to_string();
        let keyed = format!("{CHANGE}:{key}");
        let slot: Arc<OnceLock<WeakCallback>> = Arc::new(OnceLock::new());
        let own = Arc::clone(&slot);
        let relay = Callback::new(move |inv| {
            let Some(inner) = weak.upgrade() else {
                // The bag is gone: detach from the child that fired.
                let me = own.get().and_then(WeakCallback::upgrade);
                if let (Some(child), Some(me)) = (Observable::from_context(inv.context), me) {
                    child.off_callback(CHANGE, &me);
                }
                return Ok(Value::Null);
            };
            let props = Properties { inner };
            let (to, from) = (inv.arg(0), inv.arg(1));
            props.emit(&keyed, vec![to.clone(), from.clone()])?;
            props.emit(CHANGE, vec![Value::from(key.as_str()), to, from])?;
            Ok(Value::Null)
        });
        let _ = slot.set(relay.downgrade());
        relay
    }

    fn announce(&self, action: &str, key: &str) -> HookResult<()> {
        // Skip building a dispatcher nobody listens to.
        if self.inner.events.get().is_none() {
            return Ok(());
        }
        let args = vec![Value::from(key)];
        self.emit(&format!("{action}:{key}"), args.clone())?;
        self.emit(action, args)?;
        Ok(())
    }
}

fn check_key(key: &str) -> HookResult<()> {
    if key.chars().any(|c| c == '.' || c.is_whitespace()) {
        return Err(HookError::InvalidKey { key: key.to_string() });
    }
    Ok(())
}

impl Emitter for Properties {
    fn events(&self) -> &Dispatcher {
        self.inner
            .events
            .get_or_init(|| Context::new(PropertiesRef(Arc::downgrade(&self.inner))))
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = lock::read(&self.inner.entries);
        let mut map = f.debug_map();
        for (key, entry) in entries.iter() {
            map.entry(key, &entry.observable.get());
        }
        map.finish()
    }
}
