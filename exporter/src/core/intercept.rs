//! Wrapping of host operations without touching their definitions.
//!
//! An [`Intercepted`] operation owns the callable currently bound to a
//! `(target, operation)` pair. [`Intercepted::wrap`] rebinds it to a
//! replacement that receives the previous callable as its first argument and
//! decides whether, when and how to invoke it.
//!
//! Wrapping composes: a second wrapper sees the first one as "original".
//! Callers that wrap must do so once, at start-up.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

/// Callable bound to an operation. `C` is the state the operation runs against.
pub type Operation<C, A, R> = dyn Fn(&mut C, A) -> R;

pub struct Intercepted<C, A, R> {
    target: &'static str,
    operation: &'static str,
    current: Rc<Operation<C, A, R>>,
    wraps: usize,
}

impl<C: 'static, A: 'static, R: 'static> Intercepted<C, A, R> {
    pub fn new<F>(target: &'static str, operation: &'static str, original: F) -> Self
    where
        F: Fn(&mut C, A) -> R + 'static,
    {
        Self {
            target,
            operation,
            current: Rc::new(original),
            wraps: 0,
        }
    }

    /// Invoke the currently bound callable.
    pub fn call(&self, ctx: &mut C, args: A) -> R {
        (self.current)(ctx, args)
    }

    /// Rebind the operation to `replacement(original, ctx, args)`.
    pub fn wrap<F>(&mut self, replacement: F)
    where
        F: Fn(&Operation<C, A, R>, &mut C, A) -> R + 'static,
    {
        let original = Rc::clone(&self.current);
        self.current = Rc::new(move |ctx: &mut C, args: A| replacement(&*original, ctx, args));
        self.wraps += 1;
        debug!(
            target_name = self.target,
            operation = self.operation,
            wraps = self.wraps,
            "operation wrapped"
        );
    }

    /// Number of wrappers stacked on the original callable.
    pub fn wrap_count(&self) -> usize {
        self.wraps
    }

    pub fn name(&self) -> String {
        format!("{}.{}", self.target, self.operation)
    }
}

impl<C, A, R> fmt::Debug for Intercepted<C, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intercepted")
            .field("target", &self.target)
            .field("operation", &self.operation)
            .field("wraps", &self.wraps)
            .finish_non_exhaustive()
    }
}
