//! Event dispatcher: the name → registry map and its fan-out logic.
//!
//! A [`Dispatcher`] parses event strings (see [`parse`]), lazily creates one
//! [`Registry`] per event id, and fans registration, removal and triggering
//! out across every resolved id. Registries are never dropped once created,
//! only emptied.
//!
//! Every fan-out operation returns one result per resolved token, in token
//! order; [`Dispatcher::single`] extracts the result of a one-token call.

/// Process-wide default dispatcher and its aliases.
pub mod global;
/// Event-string grammar.
pub mod parse;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::callback::Callback;
use crate::config::DispatcherConfig;
use crate::context::Context;
use crate::error::HookResult;
use crate::lock;
use crate::namespace::Namespaces;
use crate::registry::{CallbackFilter, Registration, Registry, RunParams};
use crate::strategy::{BuiltinStrategy, Strategy};
use crate::value::Value;

use self::parse::tokens;

/// Options for [`Dispatcher::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// When false, a token with an empty id and at least one tag expands to
    /// every registry that currently exists.
    pub id_required: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { id_required: true }
    }
}

/// Optional owning context and priority for `on`/`once`.
#[derive(Debug, Clone, Default)]
pub struct ListenOptions {
    /// Owning context; the callback always runs under it.
    pub context: Option<Context>,
    /// Priority; lower runs first.
    pub priority: Option<i64>,
}

#[allow(missing_docs)]
impl ListenOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

#[derive(Clone, Copy)]
enum ListenMode {
    Always,
    Once,
}

struct DispatcherInner {
    registries: RwLock<BTreeMap<String, Registry>>,
    context: Option<Context>,
    config: DispatcherConfig,
}

/// Namespaced, priority-ordered event dispatcher.
///
/// Cloning a `Dispatcher` yields another handle to the same registries.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Creates a dispatcher with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, DispatcherConfig::default())
    }

    /// Creates a dispatcher whose runs default to `context`.
    #[must_use]
    pub fn with_context(context: Context) -> Self {
        Self::build(Some(context), DispatcherConfig::default())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self::build(None, config)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn with_context_and_config(context: Context, config: DispatcherConfig) -> Self {
        Self::build(Some(context), config)
    }

    fn build(context: Option<Context>, config: DispatcherConfig) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                registries: RwLock::new(BTreeMap::new()),
                context,
                config,
            }),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.inner.config
    }

    /// The default context runs use when the call supplies none.
    #[must_use]
    pub fn context(&self) -> Option<&Context> {
        self.inner.context.as_ref()
    }

    /// The registry for `name`, if it has been referenced.
    #[must_use]
    pub fn registry(&self, name: &str) -> Option<Registry> {
        lock::read(&self.inner.registries).get(name).cloned()
    }

    /// Names of every existing registry, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        lock::read(&self.inner.registries).keys().cloned().collect()
    }

    /// Callbacks registered for `name`; zero when the event is unknown.
    #[must_use]
    pub fn callback_count(&self, name: &str) -> usize {
        self.registry(name).map_or(0, |r| r.len())
    }

    fn registry_or_create(&self, name: &str) -> Registry {
        if let Some(existing) = self.registry(name) {
            return existing;
        }
        let mut registries = lock::write(&self.inner.registries);
        registries
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(event = name, "creating event registry");
                Registry::with_default_priority(name, self.inner.config.default_priority)
            })
            .clone()
    }

    /// Resolves an event string into `(registry, namespace filter)` pairs,
    /// creating registries for ids seen for the first time.
    ///
    /// Tokens with an empty id are dropped, unless `id_required` is false and
    /// the token has tags: then it stands for every registry that exists
    /// before this call. Expansion never creates registries.
    fn resolve(&self, events: &str, options: ProcessOptions) -> Vec<(Registry, Namespaces)> {
        let mut targets: Vec<(String, Namespaces)> = Vec::new();
        for token in tokens(events) {
            if token.has_id() {
                targets.push((token.id, token.namespaces));
                continue;
            }
            if options.id_required || token.namespaces.is_empty() {
                continue;
            }
            let registries = lock::read(&self.inner.registries);
            targets.extend(registries.keys().map(|name| (name.clone(), token.namespaces.clone())));
        }

        targets
            .into_iter()
            .map(|(id, namespaces)| (self.registry_or_create(&id), namespaces))
            .collect()
    }

    /// Calls `f` once per resolved token with its registry and namespace
    /// filter, returning the results in token order.
    pub fn process<R>(
        &self,
        events: &str,
        options: ProcessOptions,
        mut f: impl FnMut(&Registry, &Namespaces) -> R,
    ) -> Vec<R> {
        self.resolve(events, options)
            .iter()
            .map(|(registry, namespaces)| f(registry, namespaces))
            .collect()
    }

    /// The sole result of a one-token call, `None` for any other count.
    #[must_use]
    pub fn single<T>(mut results: Vec<T>) -> Option<T> {
        if results.len() == 1 {
            results.pop()
        } else {
            None
        }
    }

    fn listen(
        &self,
        mode: ListenMode,
        events: &str,
        callback: &Callback,
        options: ListenOptions,
    ) -> &Self {
        self.process(events, ProcessOptions::default(), |registry, namespaces| {
            let registration = Registration {
                callback: Some(callback.clone()),
                context: options.context.clone(),
                namespaces: Some(namespaces.clone()),
                priority: options.priority,
            };
            match mode {
                ListenMode::Always => registry.add(registration),
                ListenMode::Once => registry.add_once(registration),
            };
        });
        self
    }

    /// Registers `callback` on every event in `events`. Tags in each token
    /// become the callback's namespaces.
    pub fn on(&self, events: &str, callback: Callback) -> &Self {
        self.listen(ListenMode::Always, events, &callback, ListenOptions::default())
    }

    /// [`Dispatcher::on`] with an owning context and/or priority.
    pub fn on_with(&self, events: &str, callback: Callback, options: ListenOptions) -> &Self {
        self.listen(ListenMode::Always, events, &callback, options)
    }

    /// Like [`Dispatcher::on`], but each registration removes itself after
    /// its first invocation.
    pub fn once(&self, events: &str, callback: Callback) -> &Self {
        self.listen(ListenMode::Once, events, &callback, ListenOptions::default())
    }

    #[allow(missing_docs)]
    pub fn once_with(&self, events: &str, callback: Callback, options: ListenOptions) -> &Self {
        self.listen(ListenMode::Once, events, &callback, options)
    }

    /// Removes every callback matching each token's id and tags.
    ///
    /// A token with no id but with tags (`".x"`) applies to every existing
    /// event.
    pub fn off(&self, events: &str) -> &Self {
        self.remove_matching(events, None)
    }

    /// [`Dispatcher::off`], narrowed to one callback identity.
    pub fn off_callback(&self, events: &str, callback: &Callback) -> &Self {
        self.remove_matching(events, Some(callback))
    }

    fn remove_matching(&self, events: &str, callback: Option<&Callback>) -> &Self {
        let options = ProcessOptions { id_required: false };
        self.process(events, options, |registry, namespaces| {
            let filter = CallbackFilter {
                callback: callback.cloned(),
                namespaces: Some(namespaces.clone()),
                ..CallbackFilter::default()
            };
            registry.remove(&filter);
        });
        self
    }

    /// Runs every resolved event with `params`, in token order.
    ///
    /// The dispatcher's default context applies when `params` has none.
    /// Token tags are added to the namespaces of `params.filter`. The first
    /// callback error aborts the remaining tokens.
    pub fn run(&self, events: &str, params: RunParams) -> HookResult<Vec<Value>> {
        let mut params = params;
        if params.context.is_none() {
            params.context = self.inner.context.clone();
        }

        let targets = self.resolve(events, ProcessOptions::default());
        tracing::trace!(
            events,
            strategy = params.strategy.as_ref().map_or("each", Strategy::name),
            targets = targets.len(),
            "triggering events"
        );

        let mut results = Vec::with_capacity(targets.len());
        for (registry, namespaces) in targets {
            let mut run = params.clone();
            let mut merged = run.filter.namespaces.take().unwrap_or_default();
            for tag in namespaces.iter() {
                merged.insert(tag);
            }
            run.filter.namespaces = Some(merged);
            results.push(registry.run(run)?);
        }
        Ok(results)
    }

    /// Triggers `events` with `strategy`.
    pub fn trigger(
        &self,
        events: &str,
        strategy: impl Into<Strategy>,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.run(events, RunParams::new().with_strategy(strategy).with_args(args))
    }

    /// Triggers `events` with a strategy looked up by name. Unknown names
    /// fail before any callback runs.
    pub fn trigger_named(
        &self,
        events: &str,
        strategy: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.run(events, RunParams::new().with_strategy_named(strategy)?.with_args(args))
    }

    /// [`Dispatcher::trigger`] under an explicit context.
    pub fn trigger_with(
        &self,
        context: Context,
        events: &str,
        strategy: impl Into<Strategy>,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.run(
            events,
            RunParams::new().with_strategy(strategy).with_args(args).with_context(context),
        )
    }

    /// Triggers with the configured default strategy.
    pub fn emit(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.trigger(events, self.inner.config.default_strategy, args)
    }

    /// Invokes every matching callback; results are `Null`.
    pub fn each(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.trigger(events, BuiltinStrategy::Each, args)
    }

    /// Alias of [`Dispatcher::each`].
    pub fn action(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.each(events, args)
    }

    /// Folds the first argument through every matching callback.
    pub fn reduce(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.trigger(events, BuiltinStrategy::Reduce, args)
    }

    /// Alias of [`Dispatcher::reduce`].
    pub fn filter(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.reduce(events, args)
    }

    /// `Bool(true)` per event when every matching callback returns truthy.
    pub fn all(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.trigger(events, BuiltinStrategy::All, args)
    }

    /// `Bool(true)` per event when some matching callback returns truthy.
    pub fn any(&self, events: &str, args: Vec<Value>) -> HookResult<Vec<Value>> {
        self.trigger(events, BuiltinStrategy::Any, args)
    }

    #[allow(missing_docs)]
    pub fn each_with(
        &self,
        context: Context,
        events: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.trigger_with(context, events, BuiltinStrategy::Each, args)
    }

    #[allow(missing_docs)]
    pub fn action_with(
        &self,
        context: Context,
        events: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.each_with(context, events, args)
    }

    #[allow(missing_docs)]
    pub fn reduce_with(
        &self,
        context: Context,
        events: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.trigger_with(context, events, BuiltinStrategy::Reduce, args)
    }

    #[allow(missing_docs)]
    pub fn filter_with(
        &self,
        context: Context,
        events: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.reduce_with(context, events, args)
    }

    #[allow(missing_docs)]
    pub fn all_with(
        &self,
        context: Context,
        events: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.trigger_with(context, events, BuiltinStrategy::All, args)
    }

    #[allow(missing_docs)]
    pub fn any_with(
        &self,
        context: Context,
        events: &str,
        args: Vec<Value>,
    ) -> HookResult<Vec<Value>> {
        self.trigger_with(context, events, BuiltinStrategy::Any, args)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("events", &self.event_names())
            .field("context", &self.inner.context)
            .field("config", &self.inner.config)
            .finish()
    }
}
