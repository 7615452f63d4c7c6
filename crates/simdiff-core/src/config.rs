//! Run configuration.

use std::ops::Range;
use std::str::FromStr;

use serde::Serialize;
use simdiff_isa::Intrinsic;

use crate::error::{EngineError, Result};

/// How operand lanes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputStrategy {
    /// Uniform over the lane's full signed range.
    #[default]
    Uniform,
    /// Picked from a fixed set of boundary values.
    Interesting,
    /// Each lane flips a coin between the two.
    Mixed,
}

impl FromStr for InputStrategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(InputStrategy::Uniform),
            "interesting" => Ok(InputStrategy::Interesting),
            "mixed" => Ok(InputStrategy::Mixed),
            other => Err(EngineError::Config(format!("unknown input strategy '{other}'"))),
        }
    }
}

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Comparisons per instruction.
    pub repetitions: u64,
    /// Catalog indices to test, half-open.
    pub range: Range<usize>,
    /// Track repeated results and print per-instruction statistics.
    pub debug: bool,
    pub strategy: InputStrategy,
    /// Reduce scalar shift counts modulo this value.
    pub shift_modulus: Option<u32>,
    /// Print the IR of every pair that does not come back correct.
    pub dump_mismatches: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repetitions: 100,
            range: 0..Intrinsic::COUNT,
            debug: false,
            strategy: InputStrategy::default(),
            shift_modulus: None,
            dump_mismatches: true,
        }
    }
}

impl RunConfig {
    pub fn new(repetitions: u64) -> Self {
        Self {
            repetitions,
            ..Self::default()
        }
    }

    pub fn with_range(mut self, range: Range<usize>) -> Self {
        self.range = range;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_strategy(mut self, strategy: InputStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_shift_modulus(mut self, modulus: Option<u32>) -> Self {
        self.shift_modulus = modulus;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_range(&self.range)?;
        match self.shift_modulus {
            Some(0) => return Err(EngineError::Config("shift modulus must be positive".to_string())),
            // Scalar counts are `i32`.
            Some(modulus) if modulus > i32::MAX as u32 => {
                return Err(EngineError::Config(format!(
                    "shift modulus {modulus} exceeds {}",
                    i32::MAX
                )))
            }
            _ => {}
        }
        Ok(())
    }

    /// Instructions selected by [`range`](Self::range).
    pub fn instructions(&self) -> impl Iterator<Item = Intrinsic> + '_ {
        self.range.clone().filter_map(Intrinsic::from_index)
    }
}

/// Parse an instruction range written as `lower-upper`.
///
/// `lower` is inclusive and `upper` exclusive; `upper` may equal `lower`
/// (nothing runs) but not fall below it or exceed the catalog.
pub fn parse_range(text: &str) -> Result<Range<usize>> {
    let (lower, upper) = text
        .split_once('-')
        .ok_or_else(|| EngineError::Config("Intrinsic range unable to be parsed, no '-' found.".to_string()))?;
    let lower = parse_bound(lower, "lower")?;
    let upper = parse_bound(upper, "upper")?;
    let range = lower..upper;
    check_range(&range)?;
    Ok(range)
}

fn parse_bound(text: &str, which: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| EngineError::Config(format!("{which} bound '{text}' is not a non-negative integer")))
}

fn check_range(range: &Range<usize>) -> Result<()> {
    if range.end < range.start {
        return Err(EngineError::Config(
            "Upper bound can not be lower than the lower bound.".to_string(),
        ));
    }
    if range.end > Intrinsic::COUNT {
        return Err(EngineError::Config(format!(
            "Upper bound can not be higher than total number of intrinsics ({}).",
            Intrinsic::COUNT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranges() {
        assert_eq!(parse_range("10-40").unwrap(), 10..40);
        assert_eq!(parse_range("0-0").unwrap(), 0..0);
        assert_eq!(parse_range(&format!("0-{}", Intrinsic::COUNT)).unwrap(), 0..Intrinsic::COUNT);
    }

    #[test]
    fn rejects_bad_ranges() {
        for text in ["200-210", "10", "x-4", "4-x", "9-3", "-3", "3-"] {
            let err = parse_range(text).unwrap_err();
            assert!(matches!(err, EngineError::Config(_)), "{text}");
        }
    }

    #[test]
    fn default_covers_whole_catalog() {
        let config = RunConfig::default();
        config.validate().unwrap();
        assert_eq!(config.instructions().count(), Intrinsic::COUNT);
    }

    #[test]
    fn zero_modulus_is_rejected() {
        assert!(RunConfig::new(1).with_shift_modulus(Some(0)).validate().is_err());
        assert!(RunConfig::new(1).with_shift_modulus(Some(32)).validate().is_ok());
    }

    #[test]
    fn oversized_modulus_is_rejected() {
        assert!(RunConfig::new(1).with_shift_modulus(Some(4_000_000_000)).validate().is_err());
        assert!(RunConfig::new(1).with_shift_modulus(Some(i32::MAX as u32)).validate().is_ok());
    }

    #[test]
    fn strategy_names() {
        assert_eq!("Mixed".parse::<InputStrategy>().unwrap(), InputStrategy::Mixed);
        assert!("gaussian".parse::<InputStrategy>().is_err());
    }
}
