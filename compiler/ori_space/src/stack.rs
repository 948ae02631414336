//! Stack growth for the recursive parts of the engine.
//!
//! Pattern dispatch, sealed-class expansion and the coverage search all
//! recurse on the call stack. Depth grows with sealed hierarchy depth times
//! pattern nesting, so every recursive entry point goes through
//! [`ensure_sufficient_stack`].
//!
//! - **Red zone**: 100KB. Below this, the stack is grown before recursing.
//! - **Growth size**: 1MB per segment.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated per growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
