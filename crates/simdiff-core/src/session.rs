//! The execution and verification contexts and the handover between them.
//!
//! A run starts with an [`ExecutionContext`] holding one parameterised
//! wrapper per catalog entry. [`ExecutionContext::handover`] consumes it:
//! the module goes to the native compiler, and only once that succeeds is a
//! fresh [`VerificationContext`] returned. There is no way back.

use simdiff_ir::{CodegenContext, ProgramModule, Result as IrResult};
use simdiff_isa::{Intrinsic, LaneWidth, RawVectorValue};
use simdiff_native::{CompiledProgram, NativeCompiler, TargetDescription};
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::executor::execution_function_name;
use crate::synth;

pub const SRC: &str = "src";
pub const TGT: &str = "tgt";

/// Builds the module that will be compiled for native execution.
pub struct ExecutionContext {
    codegen: CodegenContext,
}

impl ExecutionContext {
    /// A module with `func{N}(i0, i1)` for every catalog entry.
    pub fn new() -> Result<Self> {
        Self::for_instructions(Intrinsic::all())
    }

    pub fn for_instructions(instructions: impl IntoIterator<Item = Intrinsic>) -> Result<Self> {
        let mut codegen = CodegenContext::new("simdiff_exec");
        for intrinsic in instructions {
            synth::build_call_function_with_free_variables(
                &mut codegen,
                &execution_function_name(intrinsic),
                intrinsic,
            )
            .map_err(|err| EngineError::construction(intrinsic.name(), err))?;
        }
        debug!(functions = codegen.module().function_count(), "populated execution module");
        Ok(Self { codegen })
    }

    pub fn module(&self) -> &ProgramModule {
        self.codegen.module()
    }

    /// Compile the execution module and switch to verification.
    ///
    /// The module is moved into the compiler; the returned program owns it.
    ///
    /// # Panics
    ///
    /// Panics if a function build was left unfinished.
    pub fn handover<C: NativeCompiler + ?Sized>(
        self,
        compiler: &C,
        target: &TargetDescription,
    ) -> Result<(CompiledProgram, VerificationContext)> {
        let mut module = self.codegen.into_module();
        module.set_target_triple(target.triple.clone());
        let program = compiler.compile(module, target)?;
        info!(functions = program.function_count(), target = %target, "execution module handed over");
        Ok((program, VerificationContext::new(Some(&target.triple))))
    }
}

/// Holds at most one live `src`/`tgt` pair at a time.
pub struct VerificationContext {
    codegen: CodegenContext,
}

impl VerificationContext {
    pub fn new(triple: Option<&str>) -> Self {
        let mut codegen = CodegenContext::new("simdiff_verify");
        if let Some(triple) = triple {
            codegen.module_mut().set_target_triple(triple);
        }
        Self { codegen }
    }

    pub fn module(&self) -> &ProgramModule {
        self.codegen.module()
    }

    pub fn function_count(&self) -> usize {
        self.codegen.module().function_count()
    }

    /// Build `tgt` returning `result` and `src` calling the model on the
    /// operands. On failure neither function remains.
    pub fn build_pair(
        &mut self,
        intrinsic: Intrinsic,
        op0: &RawVectorValue,
        op1: &RawVectorValue,
        result: &RawVectorValue,
        result_lane: LaneWidth,
    ) -> IrResult<()> {
        synth::build_constant_function(&mut self.codegen, TGT, result, result_lane)?;
        if let Err(err) = synth::build_call_function(&mut self.codegen, SRC, intrinsic, op0, op1) {
            self.codegen.erase_function(TGT);
            return Err(err);
        }
        Ok(())
    }

    /// Textual IR of the current pair.
    pub fn render_pair(&self) -> IrResult<String> {
        self.module().render_functions(&[SRC, TGT])
    }

    /// Drop the current pair.
    pub fn erase_pair(&mut self) {
        self.codegen.erase_function(SRC);
        self.codegen.erase_function(TGT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdiff_isa::{Operand, Shape, VectorWidth};

    const W8X16: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W16);

    #[test]
    fn execution_module_covers_catalog() {
        let exec = ExecutionContext::new().unwrap();
        assert_eq!(exec.module().function_count(), Intrinsic::COUNT);
        for intrinsic in Intrinsic::all() {
            let function = exec.module().function(&execution_function_name(intrinsic)).unwrap();
            assert_eq!(function.callees(), vec![intrinsic.symbol()]);
        }
    }

    #[test]
    fn pair_is_built_and_erased() {
        let pavg = Intrinsic::from_name("sse2_pavg_w").unwrap();
        let mut verify = VerificationContext::new(Some("x86_64-unknown-linux-gnu"));
        let a = RawVectorValue::from_lanes(W8X16, &[1; 8]).unwrap();
        let b = RawVectorValue::from_lanes(W8X16, &[3; 8]).unwrap();
        let r = RawVectorValue::from_lanes(W8X16, &[2; 8]).unwrap();

        let before = verify.function_count();
        verify
            .build_pair(pavg, &a, &b, &r, pavg.lane_width(Operand::Result))
            .unwrap();
        assert_eq!(verify.function_count(), before + 2);
        let text = verify.render_pair().unwrap();
        assert!(text.contains("target triple = \"x86_64-unknown-linux-gnu\""));
        assert!(text.contains("@src()"));
        assert!(text.contains("@tgt()"));

        verify.erase_pair();
        assert_eq!(verify.function_count(), before);
    }

    #[test]
    fn failed_src_leaves_no_tgt_behind() {
        let pavg = Intrinsic::from_name("sse2_pavg_w").unwrap();
        let mut verify = VerificationContext::new(None);
        let r = RawVectorValue::from_lanes(W8X16, &[2; 8]).unwrap();
        let bad = RawVectorValue::scalar(1);
        assert!(verify.build_pair(pavg, &bad, &bad, &r, LaneWidth::W16).is_err());
        assert_eq!(verify.function_count(), 0);
    }
}
