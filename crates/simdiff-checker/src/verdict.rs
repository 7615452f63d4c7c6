//! Comparison outcomes and their running totals.

use std::fmt;

use serde::Serialize;

/// Outcome of comparing one `src`/`tgt` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The two functions are equivalent for all inputs.
    Correct,
    /// The checker found an input on which they differ.
    Unsound,
    /// Neither proved nor refuted, e.g. a solver timeout.
    Failed,
    /// The checker itself broke down on this pair.
    Errored,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [Verdict::Correct, Verdict::Unsound, Verdict::Failed, Verdict::Errored];

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::Unsound => "unsound",
            Verdict::Failed => "failed",
            Verdict::Errored => "errored",
        }
    }

    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Four mutually exclusive tallies; each comparison bumps exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckCounters {
    pub correct: u64,
    pub unsound: u64,
    pub failed: u64,
    pub errors: u64,
}

impl CheckCounters {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct => self.correct += 1,
            Verdict::Unsound => self.unsound += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::Errored => self.errors += 1,
        }
    }

    pub fn get(&self, verdict: Verdict) -> u64 {
        match verdict {
            Verdict::Correct => self.correct,
            Verdict::Unsound => self.unsound,
            Verdict::Failed => self.failed,
            Verdict::Errored => self.errors,
        }
    }

    pub fn total(&self) -> u64 {
        self.correct + self.unsound + self.failed + self.errors
    }

    /// Counts accumulated since `earlier` was taken. Saturates at zero if
    /// `earlier` is actually the later snapshot.
    pub fn since(&self, earlier: &CheckCounters) -> CheckCounters {
        CheckCounters {
            correct: self.correct.saturating_sub(earlier.correct),
            unsound: self.unsound.saturating_sub(earlier.unsound),
            failed: self.failed.saturating_sub(earlier.failed),
            errors: self.errors.saturating_sub(earlier.errors),
        }
    }
}
