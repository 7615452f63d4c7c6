//! Running instructions for their true results.

use simdiff_isa::{Intrinsic, RawVectorValue};
use simdiff_native::{CompiledProgram, NativeError};

/// Name of the execution wrapper for `intrinsic`.
pub fn execution_function_name(intrinsic: Intrinsic) -> String {
    format!("func{}", intrinsic.index())
}

/// Source of ground truth: evaluates an instruction on concrete operands.
pub trait InstructionExecutor {
    fn execute(
        &self,
        intrinsic: Intrinsic,
        op0: &RawVectorValue,
        op1: &RawVectorValue,
    ) -> Result<RawVectorValue, NativeError>;

    /// Whether `intrinsic` can run here at all.
    fn supports(&self, intrinsic: Intrinsic) -> bool {
        intrinsic.is_supported_on_host()
    }
}

impl InstructionExecutor for CompiledProgram {
    fn execute(
        &self,
        intrinsic: Intrinsic,
        op0: &RawVectorValue,
        op1: &RawVectorValue,
    ) -> Result<RawVectorValue, NativeError> {
        self.resolve(&execution_function_name(intrinsic))?.invoke(op0, op1)
    }
}

impl<E: InstructionExecutor + ?Sized> InstructionExecutor for &E {
    fn execute(
        &self,
        intrinsic: Intrinsic,
        op0: &RawVectorValue,
        op1: &RawVectorValue,
    ) -> Result<RawVectorValue, NativeError> {
        (**self).execute(intrinsic, op0, op1)
    }

    fn supports(&self, intrinsic: Intrinsic) -> bool {
        (**self).supports(intrinsic)
    }
}
