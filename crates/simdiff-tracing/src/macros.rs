//! Convenience macro for performance tracing.

/// Create a [`crate::performance::PerformanceSpan`].
///
/// With fields, the guard runs inside a `perf` debug span carrying them and
/// keeps that span entered until it drops.
///
/// ```rust
/// use simdiff_tracing::perf_span;
///
/// {
///     let _span = perf_span!("instruction_run", instruction = "sse2_pavg_w");
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! perf_span {
    ($name:expr) => {{
        $crate::performance::PerformanceSpan::new($name, None)
    }};
    ($name:expr, $($field:tt = $value:expr),+ $(,)?) => {{
        $crate::performance::PerformanceSpan::within(
            $crate::tracing::debug_span!("perf", name = $name, $($field = $value),+),
            $name,
            None,
        )
    }};
}
