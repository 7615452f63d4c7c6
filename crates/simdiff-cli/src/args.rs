//! Command-line arguments.

use std::ops::Range;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use simdiff_core::{parse_range, InputStrategy, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "simdiff")]
#[command(version)]
#[command(about = "Random differential testing of x86 vector instruction models")]
#[command(long_about = "Runs random tests on the symbolic semantics of x86 vector instructions. \
Each instruction is executed natively on random operands; the observed result is then \
compared against the model by an equivalence checker. If the checker states that they \
are not equal, the model has a semantic issue that must be addressed.")]
pub struct Cli {
    /// Number of tests to perform for each instruction
    #[arg(required_unless_present = "list")]
    pub repetitions: Option<u64>,

    /// Debug mode: count repeated results and print the most common one per
    /// instruction. Disables the progress bar
    #[arg(short, long)]
    pub debug: bool,

    /// Instructions to test, as `lower-upper` (lower inclusive, upper exclusive),
    /// e.g. -r=40-50
    #[arg(short, long, value_name = "LOWER-UPPER", value_parser = parse_range_arg)]
    pub range: Option<Range<usize>>,

    /// How operand lanes are drawn
    #[arg(long, value_enum, default_value_t = Inputs::Uniform)]
    pub inputs: Inputs,

    /// Reduce the count operand of shift instructions (every lane, or the
    /// scalar) modulo this value
    #[arg(long, value_name = "N")]
    pub shift_modulus: Option<u32>,

    /// Do not print the IR of pairs that fail to verify
    #[arg(long)]
    pub no_dump: bool,

    /// Print the instruction catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to the alive-tv binary; defaults to $SIMDIFF_ALIVE_TV, then PATH
    #[arg(long, value_name = "PATH")]
    pub alive_tv: Option<PathBuf>,

    /// Solver timeout per comparison, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub smt_timeout: u64,

    /// Path to the rustc used to build native wrappers; defaults to
    /// $SIMDIFF_RUSTC, $RUSTC, then PATH
    #[arg(long, value_name = "PATH")]
    pub rustc: Option<PathBuf>,

    /// CPU to compile native wrappers for (`-C target-cpu`)
    #[arg(long, value_name = "CPU")]
    pub target_cpu: Option<String>,

    /// Keep the generated native sources and library
    #[arg(long)]
    pub keep_artifacts: bool,

    /// Verbose logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Inputs {
    Uniform,
    Interesting,
    Mixed,
}

impl From<Inputs> for InputStrategy {
    fn from(inputs: Inputs) -> Self {
        match inputs {
            Inputs::Uniform => InputStrategy::Uniform,
            Inputs::Interesting => InputStrategy::Interesting,
            Inputs::Mixed => InputStrategy::Mixed,
        }
    }
}

fn parse_range_arg(text: &str) -> Result<Range<usize>, String> {
    parse_range(text).map_err(|err| err.to_string())
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(self.repetitions.unwrap_or(0))
            .with_debug(self.debug)
            .with_strategy(self.inputs.into())
            .with_shift_modulus(self.shift_modulus);
        if let Some(range) = &self.range {
            config = config.with_range(range.clone());
        }
        config.dump_mismatches = !self.no_dump;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdiff_isa::Intrinsic;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("simdiff").chain(args.iter().copied()))
    }

    #[test]
    fn repetitions_and_range() {
        let cli = parse(&["25", "-r=10-40", "-d"]).unwrap();
        let config = cli.run_config();
        assert_eq!(config.repetitions, 25);
        assert_eq!(config.range, 10..40);
        assert!(config.debug);
        assert!(config.dump_mismatches);
    }

    #[test]
    fn default_range_is_whole_catalog() {
        let config = parse(&["1"]).unwrap().run_config();
        assert_eq!(config.range, 0..Intrinsic::COUNT);
        assert_eq!(config.strategy, InputStrategy::Uniform);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["many"]).is_err());
        assert!(parse(&["5", "-r=200-210"]).is_err());
        assert!(parse(&["5", "-r=40"]).is_err());
        assert!(parse(&["5", "-r=50-40"]).is_err());
    }

    #[test]
    fn list_needs_no_repetitions() {
        let cli = parse(&["--list"]).unwrap();
        assert!(cli.list);
        assert_eq!(cli.repetitions, None);
    }

    #[test]
    fn input_strategies() {
        let cli = parse(&["3", "--inputs", "mixed", "--shift-modulus", "64"]).unwrap();
        let config = cli.run_config();
        assert_eq!(config.strategy, InputStrategy::Mixed);
        assert_eq!(config.shift_modulus, Some(64));
    }
}
