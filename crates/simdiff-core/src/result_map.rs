//! Repeated-result tracking for debug runs.

use std::collections::HashMap;
use std::fmt::Write;

use simdiff_isa::{Intrinsic, LaneWidth, RawVectorValue};

/// How often each result value came back for one instruction.
///
/// The first sighting of a value counts zero; every later one adds a
/// repetition, so the total is the number of draws that told us nothing new.
#[derive(Debug, Default, Clone)]
pub struct ResultMap {
    repeats: HashMap<RawVectorValue, u64>,
}

impl ResultMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: RawVectorValue) {
        self.repeats
            .entry(value)
            .and_modify(|count| *count += 1)
            .or_insert(0);
    }

    /// Distinct values seen.
    pub fn distinct(&self) -> usize {
        self.repeats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repeats.is_empty()
    }

    /// Total repetitions across all values.
    pub fn repetitions(&self) -> u64 {
        self.repeats.values().sum()
    }

    /// The most repeated value, if any value repeated at all.
    ///
    /// Ties go to the value with the lexicographically smallest bytes.
    pub fn most_frequent(&self) -> Option<(&RawVectorValue, u64)> {
        self.repeats
            .iter()
            .filter(|&(_, &count)| count > 0)
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.as_bytes().cmp(a.as_bytes())))
            .map(|(value, &count)| (value, count))
    }

    /// `Number of repetitions for funcN: K | Vector: < ... >`
    pub fn report_line(&self, intrinsic: Intrinsic, lane: LaneWidth) -> String {
        let mut line = format!(
            "Number of repetitions for func{}: {}",
            intrinsic.index(),
            self.repetitions()
        );
        if let Some((value, _)) = self.most_frequent() {
            let _ = write!(line, " | Vector: {}", value.display(lane));
        }
        line
    }
}
