//! Stack growth for deep recursion over IR trees.
//!
//! ASR and AST nodes refer to their children by handle, so nothing bounds
//! nesting depth at construction time: a generated `a + (a + (a + ...))`
//! chain or a tower of nested `do` loops is one arena entry per level. Every
//! consumer then recurses once per level: [`Visitor`](crate::asr::visitor)
//! walks, statement transforms, expression replacement, pickling and the
//! serializer. Each of those recursive entry points goes through
//! [`ensure_sufficient_stack`], so depth is limited by memory rather than
//! by the thread's stack.

/// Headroom one walk frame (plus a pass's `visit_*` override) may use before
/// the next check.
const RED_ZONE: usize = 100 * 1024;

/// Segment allocated once a walk runs into the red zone.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run one level of an IR walk, moving to a fresh stack segment first when
/// the current one is nearly used up.
///
/// On `wasm32` this calls `f` directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
