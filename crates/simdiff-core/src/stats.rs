//! Per-instruction reports and the run summary.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use simdiff_checker::{CheckCounters, Verdict};
use simdiff_isa::Intrinsic;

/// How an instruction's run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstructionOutcome {
    Completed,
    /// The host CPU cannot execute it.
    Skipped { reason: String },
    /// A construction or per-call error stopped it early.
    Aborted { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct InstructionReport {
    pub index: usize,
    pub name: &'static str,
    /// Comparisons actually submitted to the checker.
    pub tests: u64,
    pub counters: CheckCounters,
    pub outcome: InstructionOutcome,
    /// Repeated results, tracked in debug runs only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeated_results: Option<u64>,
}

impl InstructionReport {
    pub fn new(intrinsic: Intrinsic) -> Self {
        Self {
            index: intrinsic.index(),
            name: intrinsic.name(),
            tests: 0,
            counters: CheckCounters::default(),
            outcome: InstructionOutcome::Completed,
            repeated_results: None,
        }
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.tests += 1;
        self.counters.record(verdict);
    }
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub tests_run: u64,
    /// Instructions that ran to completion.
    pub intrinsics_tested: u64,
    pub skipped: u64,
    pub aborted: u64,
    pub counters: CheckCounters,
    #[serde(serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub instructions: Vec<InstructionReport>,
}

impl RunSummary {
    pub fn add(&mut self, report: InstructionReport) {
        self.tests_run += report.tests;
        self.counters.correct += report.counters.correct;
        self.counters.unsound += report.counters.unsound;
        self.counters.failed += report.counters.failed;
        self.counters.errors += report.counters.errors;
        match report.outcome {
            InstructionOutcome::Completed => self.intrinsics_tested += 1,
            InstructionOutcome::Skipped { .. } => self.skipped += 1,
            InstructionOutcome::Aborted { .. } => self.aborted += 1,
        }
        self.instructions.push(report);
    }

    pub fn minutes_taken(&self) -> u64 {
        self.elapsed.as_secs() / 60
    }

    /// Every comparison came back correct and nothing was aborted.
    pub fn all_correct(&self) -> bool {
        self.counters.correct == self.counters.total() && self.aborted == 0
    }
}

fn serialize_secs<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ran {} tests on {} intrinsics.", self.tests_run, self.intrinsics_tested)?;
        writeln!(f, "Number of minutes taken: {}", self.minutes_taken())?;
        writeln!(f, "Num correct: {}", self.counters.correct)?;
        writeln!(f, "Num unsound: {}", self.counters.unsound)?;
        writeln!(f, "Num failed: {}", self.counters.failed)?;
        writeln!(f, "Num errors: {}", self.counters.errors)?;
        writeln!(f, "Num skipped: {}", self.skipped)?;
        write!(f, "Num aborted: {}", self.aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_is_well_formed() {
        let summary = RunSummary::default();
        assert_eq!(
            summary.to_string(),
            "Ran 0 tests on 0 intrinsics.\n\
             Number of minutes taken: 0\n\
             Num correct: 0\n\
             Num unsound: 0\n\
             Num failed: 0\n\
             Num errors: 0\n\
             Num skipped: 0\n\
             Num aborted: 0"
        );
        assert!(summary.all_correct());
    }

    #[test]
    fn reports_accumulate() {
        let pavg = Intrinsic::from_name("sse2_pavg_w").unwrap();
        let mut report = InstructionReport::new(pavg);
        report.record(Verdict::Correct);
        report.record(Verdict::Unsound);

        let mut skipped = InstructionReport::new(Intrinsic::at(1));
        skipped.outcome = InstructionOutcome::Skipped {
            reason: "avx512bw".into(),
        };

        let mut summary = RunSummary::default();
        summary.add(report);
        summary.add(skipped);
        summary.elapsed = Duration::from_secs(125);

        assert_eq!(summary.tests_run, 2);
        assert_eq!(summary.intrinsics_tested, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.counters.unsound, 1);
        assert_eq!(summary.minutes_taken(), 2);
        assert!(!summary.all_correct());
    }

    #[test]
    fn serializes_to_json() {
        let mut summary = RunSummary::default();
        summary.elapsed = Duration::from_millis(1500);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["tests_run"], 0);
        assert_eq!(json["elapsed"], 1.5);
        assert_eq!(json["counters"]["correct"], 0);
    }
}
