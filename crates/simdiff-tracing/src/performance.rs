//! Timing spans and standard events for the expensive steps of a run.
//!
//! A differential run spends nearly all of its time in two places: building
//! the native execution library once, and calling the equivalence checker
//! once per iteration. [`PerformanceSpan`] measures those, and the
//! `record_*` helpers emit them in a uniform shape.
//!
//! ```rust
//! use simdiff_tracing::performance::PerformanceSpan;
//!
//! {
//!     let _span = PerformanceSpan::new("native_compile", Some(1_000));
//!     // ... work ...
//! } // reported only if it took at least 1ms
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::span::EnteredSpan;
use tracing::Level;

static ENABLED: AtomicBool = AtomicBool::new(true);
// u64::MAX encodes "no global threshold".
static GLOBAL_THRESHOLD_US: AtomicU64 = AtomicU64::new(u64::MAX);

/// Apply process-wide performance span settings.
pub fn configure(enabled: bool, threshold_us: Option<u64>) {
    ENABLED.store(enabled, Ordering::Relaxed);
    GLOBAL_THRESHOLD_US.store(threshold_us.unwrap_or(u64::MAX), Ordering::Relaxed);
}

/// Whether performance spans currently report on drop.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

fn global_threshold() -> Option<u64> {
    match GLOBAL_THRESHOLD_US.load(Ordering::Relaxed) {
        u64::MAX => None,
        value => Some(value),
    }
}

/// RAII guard that measures its own lifetime and reports it on drop when the
/// duration reaches the threshold.
///
/// The effective threshold is the span's own one if given, otherwise the
/// process-wide one set by [`configure`].
pub struct PerformanceSpan {
    span_name: String,
    threshold_us: Option<u64>,
    start_time: Instant,
    span: tracing::Span,
    // Present when the guard keeps its span entered for its whole lifetime.
    entered: Option<EnteredSpan>,
}

impl PerformanceSpan {
    /// Create a debug-level span. `threshold_us = None` defers to the global threshold.
    pub fn new(span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        Self::with_level(Level::DEBUG, span_name, threshold_us)
    }

    /// Create a span at the given level.
    pub fn with_level(level: Level, span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let span_name = span_name.into();
        let span = match level {
            Level::TRACE => tracing::trace_span!("perf", name = %span_name),
            Level::DEBUG => tracing::debug_span!("perf", name = %span_name),
            Level::INFO => tracing::info_span!("perf", name = %span_name),
            Level::WARN => tracing::warn_span!("perf", name = %span_name),
            Level::ERROR => tracing::error_span!("perf", name = %span_name),
        };

        Self {
            span_name,
            threshold_us,
            start_time: Instant::now(),
            span,
            entered: None,
        }
    }

    /// Time the rest of the scope inside `span`, which stays entered until
    /// the guard drops. Work done meanwhile, and the final report, carry the
    /// span's fields.
    pub fn within(span: tracing::Span, span_name: impl Into<String>, threshold_us: Option<u64>) -> Self {
        let entered = span.clone().entered();
        Self {
            span_name: span_name.into(),
            threshold_us,
            start_time: Instant::now(),
            span,
            entered: Some(entered),
        }
    }

    pub fn name(&self) -> &str {
        &self.span_name
    }

    /// Elapsed time since creation.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }

    /// Enter this span's context.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    fn should_report(&self, elapsed_us: u64) -> bool {
        if !is_enabled() {
            return false;
        }
        self.threshold_us
            .or_else(global_threshold)
            .is_none_or(|threshold| elapsed_us >= threshold)
    }
}

impl Drop for PerformanceSpan {
    fn drop(&mut self) {
        let elapsed_us = self.elapsed_us();
        if self.should_report(elapsed_us) {
            let _entered = self.span.enter();
            tracing::debug!(
                duration_us = elapsed_us,
                duration_ms = elapsed_us as f64 / 1000.0,
                "performance_span_complete"
            );
        }
        self.entered.take();
    }
}

/// Record a native library build.
pub fn record_compilation(functions: usize, source_bytes: usize, duration_us: u64) {
    tracing::debug!(
        event = "compilation",
        functions = functions,
        source_bytes = source_bytes,
        duration_us = duration_us,
        duration_ms = duration_us as f64 / 1000.0,
        "native_compilation"
    );
}

/// Record one equivalence check and its verdict.
pub fn record_check(function: &str, verdict: &str, duration_us: u64) {
    tracing::debug!(
        event = "check",
        function = function,
        verdict = verdict,
        duration_us = duration_us,
        duration_ms = duration_us as f64 / 1000.0,
        "equivalence_check"
    );
}

/// Record the iteration rate for one instruction's test run.
pub fn record_throughput(instruction: &str, iterations: u64, duration_us: u64) {
    let iterations_per_sec = if duration_us > 0 {
        (iterations as f64 / duration_us as f64) * 1_000_000.0
    } else {
        0.0
    };

    tracing::debug!(
        event = "throughput",
        instruction = instruction,
        iterations = iterations,
        duration_us = duration_us,
        iterations_per_sec = iterations_per_sec,
        "instruction_throughput"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn span_keeps_name_and_threshold() {
        let span = PerformanceSpan::new("native_compile", Some(1000));
        assert_eq!(span.name(), "native_compile");
        assert_eq!(span.threshold_us, Some(1000));
    }

    #[test]
    fn span_elapsed_grows() {
        let span = PerformanceSpan::new("sleep", None);
        thread::sleep(Duration::from_millis(5));
        assert!(span.elapsed_us() >= 5_000);
    }

    #[test]
    fn local_threshold_filters_short_spans() {
        let span = PerformanceSpan::with_level(Level::INFO, "quick", Some(10_000_000));
        if is_enabled() {
            assert!(!span.should_report(5));
            assert!(span.should_report(10_000_000));
        }
    }

    #[test]
    fn record_helpers_do_not_panic() {
        record_compilation(107, 64 * 1024, 1500);
        record_check("src", "correct", 300);
        record_throughput("sse2_pavg_w", 100, 0);
    }
}
