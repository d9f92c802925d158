//! Dispatch strategies.
//!
//! A strategy turns the ordered, filtered callback list of one registry run
//! into a single result. The built-in table is closed; callers that need
//! something else supply a [`CustomStrategy`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::callback::BoundCallback;
use crate::context::Context;
use crate::error::{HookError, HookResult};
use crate::value::Value;

/// The built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStrategy {
    /// Invoke every callback in order; the result is `Null`.
    #[default]
    #[serde(alias = "action")]
    Each,
    /// Left fold. The first argument seeds the accumulator, each callback
    /// receives `[accumulator, rest...]` and returns the next accumulator.
    #[serde(alias = "filter")]
    Reduce,
    /// Invoke every callback; true iff every result is truthy.
    All,
    /// Invoke every callback; true iff at least one result is truthy.
    Any,
}

impl BuiltinStrategy {
    /// Every accepted name, aliases included.
    pub const NAMES: [&'static str; 6] = ["each", "action", "reduce", "filter", "all", "any"];

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Each => "each",
            Self::Reduce => "reduce",
            Self::All => "all",
            Self::Any => "any",
        }
    }

    /// Runs the strategy over `callbacks`.
    pub fn apply(
        self,
        callbacks: &[BoundCallback],
        args: Vec<Value>,
        context: &Context,
    ) -> HookResult<Value> {
        match self {
            Self::Each => each(callbacks, &args, context),
            Self::Reduce => reduce(callbacks, args, context),
            Self::All => all(callbacks, &args, context),
            Self::Any => any(callbacks, &args, context),
        }
    }
}

impl FromStr for BuiltinStrategy {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "each" | "action" => Ok(Self::Each),
            "reduce" | "filter" => Ok(Self::Reduce),
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            other => Err(HookError::UnknownStrategy {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BuiltinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a caller-supplied strategy.
pub type StrategyFn =
    dyn Fn(&[BoundCallback], Vec<Value>, &Context) -> HookResult<Value> + Send + Sync;

/// A caller-supplied strategy with a label used in logs.
#[derive(Clone)]
pub struct CustomStrategy {
    label: String,
    func: Arc<StrategyFn>,
}

impl CustomStrategy {
    #[allow(missing_docs)]
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[BoundCallback], Vec<Value>, &Context) -> HookResult<Value> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for CustomStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomStrategy").field("label", &self.label).finish_non_exhaustive()
    }
}

/// A strategy selected by variant or supplied directly.
#[derive(Debug, Clone)]
pub enum Strategy {
    #[allow(missing_docs)]
    Builtin(BuiltinStrategy),
    #[allow(missing_docs)]
    Custom(CustomStrategy),
}

impl Strategy {
    #[allow(missing_docs)]
    pub const EACH: Self = Self::Builtin(BuiltinStrategy::Each);
    #[allow(missing_docs)]
    pub const REDUCE: Self = Self::Builtin(BuiltinStrategy::Reduce);
    #[allow(missing_docs)]
    pub const ALL: Self = Self::Builtin(BuiltinStrategy::All);
    #[allow(missing_docs)]
    pub const ANY: Self = Self::Builtin(BuiltinStrategy::Any);

    /// Resolves a built-in strategy by name. Unknown names are an error.
    pub fn named(name: &str) -> HookResult<Self> {
        name.parse::<BuiltinStrategy>().map(Self::Builtin).map_err(|err| {
            tracing::warn!(strategy = name, "unknown dispatch strategy requested");
            err
        })
    }

    /// Wraps a caller-supplied function.
    pub fn custom<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[BoundCallback], Vec<Value>, &Context) -> HookResult<Value> + Send + Sync + 'static,
    {
        Self::Custom(CustomStrategy::new(label, func))
    }

    /// Name for logging.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(b) => b.name(),
            Self::Custom(c) => c.label(),
        }
    }

    /// Runs the strategy over `callbacks`.
    pub fn apply(
        &self,
        callbacks: &[BoundCallback],
        args: Vec<Value>,
        context: &Context,
    ) -> HookResult<Value> {
        match self {
            Self::Builtin(b) => b.apply(callbacks, args, context),
            Self::Custom(c) => (c.func)(callbacks, args, context),
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::EACH
    }
}

impl From<BuiltinStrategy> for Strategy {
    fn from(b: BuiltinStrategy) -> Self {
        Self::Builtin(b)
    }
}

impl From<CustomStrategy> for Strategy {
    fn from(c: CustomStrategy) -> Self {
        Self::Custom(c)
    }
}

fn each(callbacks: &[BoundCallback], args: &[Value], context: &Context) -> HookResult<Value> {
    for cb in callbacks {
        cb.invoke(context, args)?;
    }
    Ok(Value::Null)
}

fn reduce(
    callbacks: &[BoundCallback],
    mut args: Vec<Value>,
    context: &Context,
) -> HookResult<Value> {
    let mut memo = if args.is_empty() { Value::Null } else { args.remove(0) };

    // Reused buffer: slot 0 is the accumulator, the rest are the remaining args.
    let mut call_args = Vec::with_capacity(args.len() + 1);
    for cb in callbacks {
        call_args.clear();
        call_args.push(memo);
        call_args.extend(args.iter().cloned());
        memo = cb.invoke(context, &call_args)?;
    }
    Ok(memo)
}

// `all` and `any` invoke every callback even after the outcome is settled;
// side-effecting callbacks rely on running.
fn all(callbacks: &[BoundCallback], args: &[Value], context: &Context) -> HookResult<Value> {
    let mut result = true;
    for cb in callbacks {
        let truthy = cb.invoke(context, args)?.is_truthy();
        result = result && truthy;
    }
    Ok(Value::Bool(result))
}

fn any(callbacks: &[BoundCallback], args: &[Value], context: &Context) -> HookResult<Value> {
    let mut result = false;
    for cb in callbacks {
        let truthy = cb.invoke(context, args)?.is_truthy();
        result = result || truthy;
    }
    Ok(Value::Bool(result))
}
