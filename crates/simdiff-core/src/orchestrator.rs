//! The differential test loop.
//!
//! For every selected instruction and every repetition:
//!
//! 1. draw operands,
//! 2. execute the instruction natively,
//! 3. build `tgt` (the observed result) and `src` (a call to the model),
//! 4. ask the checker whether they agree and tally the verdict,
//! 5. erase both functions again.
//!
//! Verdicts are data, never errors. Construction problems abort one
//! instruction; infrastructure failures abort the run.

use std::time::Instant;

use simdiff_checker::{EquivalenceChecker, Verdict};
use simdiff_isa::{Intrinsic, Operand, RawVectorValue};
use simdiff_native::NativeError;
use simdiff_tracing::perf_span;
use simdiff_tracing::performance::record_throughput;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::{EngineError, Result};
use crate::executor::InstructionExecutor;
use crate::random::InputGenerator;
use crate::result_map::ResultMap;
use crate::session::{VerificationContext, SRC, TGT};
use crate::stats::{InstructionOutcome, InstructionReport, RunSummary};

/// Hooks for presenting a run as it happens.
pub trait RunObserver {
    fn instruction_started(&mut self, _intrinsic: Intrinsic) {}

    /// A pair that did not verify, with its textual IR.
    fn mismatch(&mut self, _intrinsic: Intrinsic, _verdict: Verdict, _ir: &str) {}

    /// Called once per selected instruction, skipped ones included.
    /// `results` is only present in debug runs.
    fn instruction_finished(&mut self, _report: &InstructionReport, _results: Option<&ResultMap>) {}

    fn progress(&mut self, _done: usize, _total: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl RunObserver for SilentObserver {}

pub struct Orchestrator<E, C> {
    config: RunConfig,
    executor: E,
    checker: C,
    verification: VerificationContext,
    inputs: InputGenerator,
}

impl<E: InstructionExecutor, C: EquivalenceChecker> Orchestrator<E, C> {
    pub fn new(config: RunConfig, executor: E, checker: C, verification: VerificationContext) -> Result<Self> {
        config.validate()?;
        let inputs = InputGenerator::from_entropy(config.strategy).with_shift_modulus(config.shift_modulus);
        Ok(Self {
            config,
            executor,
            checker,
            verification,
            inputs,
        })
    }

    /// Replace the input generator, e.g. with a seeded one.
    pub fn with_inputs(mut self, inputs: InputGenerator) -> Self {
        self.inputs = inputs.with_shift_modulus(self.config.shift_modulus);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn verification(&self) -> &VerificationContext {
        &self.verification
    }

    pub fn run(&mut self, observer: &mut dyn RunObserver) -> Result<RunSummary> {
        let started = Instant::now();
        let instructions: Vec<Intrinsic> = self.config.instructions().collect();
        let total = instructions.len();
        info!(
            instructions = total,
            repetitions = self.config.repetitions,
            checker = self.checker.name(),
            "starting differential run"
        );

        let mut summary = RunSummary::default();
        observer.progress(0, total);
        for (done, intrinsic) in instructions.into_iter().enumerate() {
            observer.instruction_started(intrinsic);
            let (report, results) = self.run_instruction(intrinsic, observer)?;
            observer.instruction_finished(&report, results.as_ref());
            summary.add(report);
            observer.progress(done + 1, total);
        }

        summary.elapsed = started.elapsed();
        info!(
            tests = summary.tests_run,
            correct = summary.counters.correct,
            unsound = summary.counters.unsound,
            failed = summary.counters.failed,
            errors = summary.counters.errors,
            "differential run finished"
        );
        Ok(summary)
    }

    /// Test one instruction `repetitions` times.
    ///
    /// Returns `Err` only for fatal errors; everything else ends up in the
    /// report's outcome.
    pub fn run_instruction(
        &mut self,
        intrinsic: Intrinsic,
        observer: &mut dyn RunObserver,
    ) -> Result<(InstructionReport, Option<ResultMap>)> {
        let mut report = InstructionReport::new(intrinsic);
        let mut results = self.config.debug.then(ResultMap::new);

        if !self.executor.supports(intrinsic) {
            debug!(instruction = intrinsic.name(), "skipping, unsupported on this CPU");
            report.outcome = InstructionOutcome::Skipped {
                reason: format!("CPU lacks {}", intrinsic.features().join("+")),
            };
            return Ok((report, None));
        }

        let _span = perf_span!("instruction_run", instruction = intrinsic.name());
        let started = Instant::now();
        for _ in 0..self.config.repetitions {
            match self.iteration(intrinsic, observer) {
                Ok((verdict, result)) => {
                    report.record(verdict);
                    if let Some(results) = results.as_mut() {
                        results.record(result);
                    }
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(EngineError::Native(NativeError::UnsupportedCpu { features, .. })) => {
                    report.outcome = InstructionOutcome::Skipped {
                        reason: format!("CPU lacks {}", features.join("+")),
                    };
                    break;
                }
                Err(err) => {
                    warn!(instruction = intrinsic.name(), error = %err, "aborting instruction");
                    report.outcome = InstructionOutcome::Aborted {
                        reason: err.to_string(),
                    };
                    break;
                }
            }
        }

        record_throughput(intrinsic.name(), report.tests, started.elapsed().as_micros() as u64);
        report.repeated_results = results.as_ref().map(ResultMap::repetitions);
        Ok((report, results))
    }

    fn iteration(&mut self, intrinsic: Intrinsic, observer: &mut dyn RunObserver) -> Result<(Verdict, RawVectorValue)> {
        let op0 = self.inputs.random_vector(intrinsic.shape_of(Operand::First));
        let op1_shape = intrinsic.shape_of(Operand::Second);
        let op1 = if intrinsic.has_shift_count() {
            self.inputs.random_shift_count(op1_shape)
        } else {
            self.inputs.random_vector(op1_shape)
        };

        let result = self.executor.execute(intrinsic, &op0, &op1)?;
        let result_shape = intrinsic.shape_of(Operand::Result);
        if !result.fits(result_shape) {
            return Err(NativeError::signature_mismatch(
                intrinsic.name(),
                format!("result has {} bits, expected {result_shape}", result.bit_size()),
            )
            .into());
        }

        let before = self.verification.function_count();
        self.verification
            .build_pair(intrinsic, &op0, &op1, &result, intrinsic.lane_width(Operand::Result))
            .map_err(|err| EngineError::construction(intrinsic.name(), err))?;

        let verdict = self.checker.compare(self.verification.module(), SRC, TGT);
        if !verdict.is_correct() {
            debug!(instruction = intrinsic.name(), %verdict, "pair did not verify");
            if self.config.dump_mismatches {
                match self.verification.render_pair() {
                    Ok(ir) => observer.mismatch(intrinsic, verdict, &ir),
                    Err(err) => warn!(error = %err, "cannot render mismatching pair"),
                }
            }
        }

        self.verification.erase_pair();
        debug_assert_eq!(self.verification.function_count(), before);
        Ok((verdict, result))
    }
}
