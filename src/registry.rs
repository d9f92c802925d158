//! Per-event callback registry.
//!
//! A [`Registry`] holds the callbacks registered for one event name, kept in
//! non-decreasing priority order. Equal priorities keep registration order:
//! a new callback is inserted after the last existing callback whose
//! priority is less than or equal to its own.
//!
//! # Concurrency
//!
//! `Registry` is a cheap cloneable handle. Mutation is serialized by an
//! internal `RwLock`. [`Registry::run`] copies the bound invocables of the
//! matching callbacks out of the lock before invoking any of them, so a
//! callback may add to, remove from, or run the same registry without
//! affecting the run in flight.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use crate::callback::{BoundCallback, Callback, WeakCallback};
use crate::context::{Context, EventName};
use crate::error::HookResult;
use crate::lock;
use crate::namespace::Namespaces;
use crate::strategy::Strategy;
use crate::value::Value;

/// Priority assigned when a registration does not specify one.
pub const DEFAULT_PRIORITY: i64 = 10;

/// A request to add a callback to a registry.
///
/// All fields are optional. A registration without a callback is accepted
/// and ignored.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    /// The function to register.
    pub callback: Option<Callback>,
    /// Owning context. When set, the callback always runs under it.
    pub context: Option<Context>,
    /// Namespace tags. Defaults to the empty set.
    pub namespaces: Option<Namespaces>,
    /// Priority. Defaults to the registry's default (10 unless configured).
    pub priority: Option<i64>,
}

impl Registration {
    #[allow(missing_docs)]
    #[must_use]
    pub fn new(callback: Callback) -> Self {
        Self {
            callback: Some(callback),
            ..Self::default()
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A registered callback.
#[derive(Debug, Clone)]
struct CallbackRecord {
    callback: Callback,
    context: Option<Context>,
    namespaces: Namespaces,
    priority: i64,
    bound: BoundCallback,
}

/// Selects callbacks for removal or for a run.
///
/// Every present field must match; absent fields are wildcards. The
/// namespace field matches when its tags are a subset of the callback's
/// tags, every other field compares by identity or equality. The default
/// filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct CallbackFilter {
    /// Function identity.
    pub callback: Option<Callback>,
    /// Owning context identity.
    pub context: Option<Context>,
    /// Exact priority.
    pub priority: Option<i64>,
    /// Required namespace tags.
    pub namespaces: Option<Namespaces>,
}

#[allow(missing_docs)]
impl CallbackFilter {
    /// A filter that matches every callback.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_namespaces(mut self, namespaces: Namespaces) -> Self {
        self.namespaces = Some(namespaces);
        self
    }

    fn matches(&self, record: &CallbackRecord) -> bool {
        if let Some(cb) = &self.callback {
            if !cb.same(&record.callback) {
                return false;
            }
        }
        if let Some(ctx) = &self.context {
            match &record.context {
                Some(owner) if owner.same(ctx) => {}
                _ => return false,
            }
        }
        if let Some(priority) = self.priority {
            if priority != record.priority {
                return false;
            }
        }
        if let Some(ns) = &self.namespaces {
            if !ns.is_subset_of(&record.namespaces) {
                return false;
            }
        }
        true
    }
}

/// Parameters of a single [`Registry::run`].
#[derive(Debug, Clone, Default)]
pub struct RunParams {
    /// Positional arguments handed to the strategy.
    pub args: Vec<Value>,
    /// Strategy to run. Defaults to `each`.
    pub strategy: Option<Strategy>,
    /// Context for unbound callbacks. Defaults to the registry's context.
    pub context: Option<Context>,
    /// Which callbacks take part.
    pub filter: CallbackFilter,
}

#[allow(missing_docs)]
impl RunParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: impl Into<Strategy>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Resolves `name` against the built-in strategy table.
    pub fn with_strategy_named(mut self, name: &str) -> HookResult<Self> {
        self.strategy = Some(Strategy::named(name)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: CallbackFilter) -> Self {
        self.filter = filter;
        self
    }
}

struct RegistryInner {
    name: String,
    default_priority: i64,
    callbacks: RwLock<Vec<CallbackRecord>>,
    context: RwLock<Option<Context>>,
    /// Used when neither the run nor the registry supplies a context.
    fallback: Context,
}

/// The priority-ordered callbacks of one event.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Creates an empty registry for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_default_priority(name, DEFAULT_PRIORITY)
    }

    pub(crate) fn with_default_priority(name: impl Into<String>, default_priority: i64) -> Self {
        let name = name.into();
        let fallback = Context::new(EventName(name.clone()));
        Self {
            inner: Arc::new(RegistryInner {
                name,
                default_priority,
                callbacks: RwLock::new(Vec::new()),
                context: RwLock::new(None),
                fallback,
            }),
        }
    }

    /// The event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        lock::read(&self.inner.callbacks).len()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of callbacks `filter` selects.
    #[must_use]
    pub fn count_matching(&self, filter: &CallbackFilter) -> usize {
        lock::read(&self.inner.callbacks).iter().filter(|r| filter.matches(r)).count()
    }

    /// Registered priorities in dispatch order.
    #[must_use]
    pub fn priorities(&self) -> Vec<i64> {
        lock::read(&self.inner.callbacks).iter().map(|r| r.priority).collect()
    }

    /// The configured default context, if any.
    #[must_use]
    pub fn context(&self) -> Option<Context> {
        lock::read(&self.inner.context).clone()
    }

    /// Sets or clears the default context for unbound callbacks.
    pub fn set_context(&self, context: Option<Context>) -> &Self {
        *lock::write(&self.inner.context) = context;
        self
    }

    /// The context unbound callbacks see when nothing else is configured.
    #[must_use]
    pub fn fallback_context(&self) -> &Context {
        &self.inner.fallback
    }

    /// Adds a callback in priority order.
    ///
    /// A registration without a callback is ignored.
    pub fn add(&self, registration: Registration) -> &Self {
        let Some(callback) = registration.callback else {
            return self;
        };

        let priority = registration.priority.unwrap_or(self.inner.default_priority);
        let bound = BoundCallback::new(callback.clone(), registration.context.clone());
        let record = CallbackRecord {
            callback,
            context: registration.context,
            namespaces: registration.namespaces.unwrap_or_default(),
            priority,
            bound,
        };

        let mut callbacks = lock::write(&self.inner.callbacks);
        // First index whose priority is greater than ours: FIFO among equals.
        let pos = callbacks.partition_point(|r| r.priority <= priority);
        callbacks.insert(pos, record);
        self
    }

    /// Adds a callback that removes itself after its first invocation.
    ///
    /// The callback runs at most once even if the event is triggered again
    /// from inside the callback itself.
    pub fn add_once(&self, mut registration: Registration) -> &Self {
        let Some(wrapped) = registration.callback.take() else {
            return self;
        };

        let registry = Arc::downgrade(&self.inner);
        let fired = AtomicBool::new(false);
        let slot: Arc<OnceLock<WeakCallback>> = Arc::new(OnceLock::new());
        let wrapper_slot = Arc::clone(&slot);

        let wrapper = Callback::new(move |inv| {
            if fired.swap(true, Ordering::AcqRel) {
                return Ok(Value::Null);
            }
            let result = wrapped.call(inv.context, inv.args);

            let me = wrapper_slot.get().and_then(WeakCallback::upgrade);
            if let (Some(inner), Some(me)) = (registry.upgrade(), me) {
                let registry = Registry { inner };
                registry.remove(&CallbackFilter::any().with_callback(me));
                tracing::trace!(event = registry.name(), "once callback removed itself");
            }
            result
        });
        let _ = slot.set(wrapper.downgrade());

        registration.callback = Some(wrapper);
        self.add(registration)
    }

    /// Removes every callback `filter` selects.
    pub fn remove(&self, filter: &CallbackFilter) -> &Self {
        let mut callbacks = lock::write(&self.inner.callbacks);
        let before = callbacks.len();
        callbacks.retain(|r| !filter.matches(r));
        let removed = before - callbacks.len();
        drop(callbacks);

        if removed > 0 {
            tracing::trace!(event = %self.inner.name, removed, "callbacks removed");
        }
        self
    }

    /// Runs the callbacks selected by `params.filter` through the strategy.
    ///
    /// Context resolution for unbound callbacks: `params.context`, then the
    /// registry's configured context, then [`Registry::fallback_context`].
    /// The first callback error aborts the run and is returned.
    pub fn run(&self, params: RunParams) -> HookResult<Value> {
        let RunParams {
            args,
            strategy,
            context,
            filter,
        } = params;

        let strategy = strategy.unwrap_or_default();
        let context = context
            .or_else(|| self.context())
            .unwrap_or_else(|| self.inner.fallback.clone());

        let callbacks: Vec<BoundCallback> = lock::read(&self.inner.callbacks)
            .iter()
            .filter(|r| filter.matches(r))
            .map(|r| r.bound.clone())
            .collect();

        tracing::trace!(
            event = %self.inner.name,
            strategy = strategy.name(),
            callbacks = callbacks.len(),
            "running event"
        );

        strategy.apply(&callbacks, args, &context)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.inner.name)
            .field("callbacks", &self.len())
            .finish()
    }
}
