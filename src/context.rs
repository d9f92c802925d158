//! Invocation contexts.
//!
//! A [`Context`] is the receiver a callback runs "on behalf of". Contexts are
//! compared by identity, never by content: two contexts built from equal
//! values are still different contexts.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A shared, identity-compared invocation context.
///
/// Cloning a `Context` yields a handle to the same context.
#[derive(Clone)]
pub struct Context {
    inner: Arc<dyn Any + Send + Sync>,
}

impl Context {
    /// Wraps a value as a new context with its own identity.
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Returns the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Returns true if `T` is the wrapped type.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Identity comparison.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.inner).cast::<()>(),
            Arc::as_ptr(&other.inner).cast::<()>(),
        )
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("addr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// The fallback context of a registry: its event name.
///
/// Callbacks run through a registry with no configured context observe this
/// value, created once per registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName(pub String);

impl EventName {
    /// The event name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_content() {
        let a = Context::new(5_u32);
        let b = Context::new(5_u32);
        assert!(!a.same(&b));
        assert!(a.same(&a.clone()));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_downcast() {
        let ctx = Context::new(EventName("save".to_string()));
        assert!(ctx.is::<EventName>());
        assert_eq!(ctx.downcast_ref::<EventName>().map(EventName::as_str), Some("save"));
        assert!(ctx.downcast_ref::<u32>().is_none());
    }
}
