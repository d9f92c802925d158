//! Callbacks and their pre-bound invocables.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::context::Context;
use crate::error::HookResult;
use crate::value::Value;

/// The function shape every callback has.
pub type CallbackFn = dyn Fn(&Invocation<'_>) -> HookResult<Value> + Send + Sync;

/// What a callback sees when it runs: the context it runs under and its
/// positional arguments.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// The context in effect for this call.
    pub context: &'a Context,
    /// Positional arguments.
    pub args: &'a [Value],
}

impl<'a> Invocation<'a> {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(context: &'a Context, args: &'a [Value]) -> Self {
        Self { context, args }
    }

    /// The argument at `index`, or `Null` when absent.
    #[must_use]
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }
}

/// A shared callback function.
///
/// Cloning a `Callback` produces another handle to the same function, and
/// [`Callback::same`] reports identity. Removal and filtering by function
/// compare identity, so keep a clone of the callback you intend to remove.
#[derive(Clone)]
pub struct Callback {
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wraps a function that produces a result.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> HookResult<Value> + Send + Sync + 'static,
    {
        Self { func: Arc::new(func) }
    }

    /// Wraps a side-effect-only function. Its result is `Null`.
    pub fn action<F>(func: F) -> Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        Self::new(move |inv| {
            func(inv);
            Ok(Value::Null)
        })
    }

    /// Invokes the function under `context`.
    pub fn call(&self, context: &Context, args: &[Value]) -> HookResult<Value> {
        (self.func)(&Invocation::new(context, args))
    }

    /// Identity comparison.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func).cast::<()>(),
            Arc::as_ptr(&other.func).cast::<()>(),
        )
    }

    pub(crate) fn downgrade(&self) -> WeakCallback {
        WeakCallback(Arc::downgrade(&self.func))
    }
}

/// Non-owning handle to a [`Callback`], used by self-removing wrappers.
pub(crate) struct WeakCallback(Weak<CallbackFn>);

impl WeakCallback {
    pub(crate) fn upgrade(&self) -> Option<Callback> {
        self.0.upgrade().map(|func| Callback { func })
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("addr", &Arc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}

/// A callback with its owning context resolved once, at registration.
///
/// When an owning context is present it wins over whatever context the
/// strategy passes.
#[derive(Debug, Clone)]
pub struct BoundCallback {
    callback: Callback,
    context: Option<Context>,
}

impl BoundCallback {
    pub(crate) fn new(callback: Callback, context: Option<Context>) -> Self {
        Self { callback, context }
    }

    /// Invokes the callback. `context` is ignored if the callback was bound.
    pub fn invoke(&self, context: &Context, args: &[Value]) -> HookResult<Value> {
        let ctx = self.context.as_ref().unwrap_or(context);
        self.callback.call(ctx, args)
    }

    /// Whether an owning context was bound at registration.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.context.is_some()
    }
}
