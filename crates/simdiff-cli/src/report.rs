//! Terminal output for a run.

use std::io::{self, Stderr, Write};

use simdiff_checker::Verdict;
use simdiff_core::{InstructionOutcome, InstructionReport, ResultMap, RunObserver};
use simdiff_isa::{Intrinsic, Operand};
use tracing::warn;

use crate::progress::ProgressBar;

/// Prints failing pairs to stdout and progress to stderr.
///
/// In debug mode the progress bar is replaced by one line per instruction
/// with its most frequent result.
pub struct CliObserver {
    debug: bool,
    progress: Option<ProgressBar<Stderr>>,
}

impl CliObserver {
    pub fn new(debug: bool, show_progress: bool) -> Self {
        let progress = (show_progress && !debug).then(|| ProgressBar::new(io::stderr()));
        Self { debug, progress }
    }

    /// End the progress line, if one was drawn.
    pub fn finish(&mut self) {
        if let Some(bar) = &mut self.progress {
            let _ = bar.finish();
        }
    }
}

impl RunObserver for CliObserver {
    fn mismatch(&mut self, intrinsic: Intrinsic, verdict: Verdict, ir: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "; {} ({verdict})", intrinsic.name());
        let _ = writeln!(out, "{ir}");
    }

    fn instruction_finished(&mut self, report: &InstructionReport, results: Option<&ResultMap>) {
        match &report.outcome {
            InstructionOutcome::Completed => {}
            InstructionOutcome::Skipped { reason } => {
                warn!(instruction = report.name, %reason, "skipped");
            }
            InstructionOutcome::Aborted { reason } => {
                eprintln!("{} aborted after {} tests: {reason}", report.name, report.tests);
            }
        }
        if !self.debug {
            return;
        }
        if let Some(results) = results {
            let intrinsic = Intrinsic::at(report.index);
            println!("{}", results.report_line(intrinsic, intrinsic.lane_width(Operand::Result)));
        }
    }

    fn progress(&mut self, done: usize, total: usize) {
        if let Some(bar) = &mut self.progress {
            let _ = bar.update(done, total);
        }
    }
}

/// The catalog, one entry per line: index, name, operand and result
/// shapes, native function and required CPU features.
pub fn catalog_listing() -> String {
    Intrinsic::all()
        .map(|intrinsic| {
            let shapes = format!(
                "{}, {} -> {}",
                intrinsic.shape_of(Operand::First),
                intrinsic.shape_of(Operand::Second),
                intrinsic.shape_of(Operand::Result)
            );
            format!(
                "{:>3} {:<24} {:<28} {:<24} {}\n",
                intrinsic.index(),
                intrinsic.name(),
                shapes,
                intrinsic.native_fn(),
                intrinsic.features().join(",")
            )
        })
        .collect()
}
