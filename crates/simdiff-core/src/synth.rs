//! Synthetic program construction.
//!
//! Three shapes of function are ever built:
//!
//! * a constant function returning an observed result (`tgt`),
//! * a call to an instruction's model with literal operands (`src`),
//! * a call with the operands as parameters `i0`, `i1` (`func{N}` in the
//!   execution module).

use simdiff_ir::{CodegenContext, Expr, Function, FunctionSpec, IrType, Prototype, Result};
use simdiff_isa::{Intrinsic, LaneWidth, Operand, RawVectorValue, Shape};

/// IR type of a catalog shape.
pub fn ir_type(shape: Shape) -> IrType {
    IrType::from_shape(shape)
}

/// IR type of a raw value read as lanes of `lane` bits.
pub fn value_type(value: &RawVectorValue, lane: LaneWidth) -> IrType {
    if value.is_scalar() {
        IrType::I32
    } else {
        IrType::vector(value.bit_size() / lane.bits(), lane.bits())
    }
}

/// Declare the model symbol of `intrinsic`. Repeated declarations are
/// accepted.
pub fn declare_model(ctx: &mut CodegenContext, intrinsic: Intrinsic) -> Result<()> {
    let params = Operand::INPUTS
        .iter()
        .map(|&operand| ir_type(intrinsic.shape_of(operand)))
        .collect();
    ctx.declare(intrinsic.symbol(), ir_type(intrinsic.shape_of(Operand::Result)), params)
}

/// `name() -> <value>`: returns `value` split into lanes of `lane` bits.
pub fn build_constant_function<'c>(
    ctx: &'c mut CodegenContext,
    name: &str,
    value: &RawVectorValue,
    lane: LaneWidth,
) -> Result<&'c Function> {
    let prototype = Prototype::new(name, value_type(value, lane), Vec::new());
    ctx.build_function(FunctionSpec::new(prototype, Expr::from_value(value, lane)))
}

/// `name()` calling the model of `intrinsic` on literal `op0`, `op1`.
pub fn build_call_function<'c>(
    ctx: &'c mut CodegenContext,
    name: &str,
    intrinsic: Intrinsic,
    op0: &RawVectorValue,
    op1: &RawVectorValue,
) -> Result<&'c Function> {
    declare_model(ctx, intrinsic)?;
    let args = vec![
        Expr::from_value(op0, intrinsic.lane_width(Operand::First)),
        Expr::from_value(op1, intrinsic.lane_width(Operand::Second)),
    ];
    let prototype = Prototype::new(name, ir_type(intrinsic.shape_of(Operand::Result)), Vec::new());
    ctx.build_function(FunctionSpec::new(prototype, Expr::call(intrinsic.symbol(), args)))
}

/// `name(i0, i1)` calling the model of `intrinsic` on its parameters.
pub fn build_call_function_with_free_variables<'c>(
    ctx: &'c mut CodegenContext,
    name: &str,
    intrinsic: Intrinsic,
) -> Result<&'c Function> {
    declare_model(ctx, intrinsic)?;
    let params: Vec<IrType> = Operand::INPUTS
        .iter()
        .map(|&operand| ir_type(intrinsic.shape_of(operand)))
        .collect();
    let args = (0..params.len()).map(|i| Expr::var(Prototype::param_name(i))).collect();
    let prototype = Prototype::new(name, ir_type(intrinsic.shape_of(Operand::Result)), params);
    ctx.build_function(FunctionSpec::new(prototype, Expr::call(intrinsic.symbol(), args)))
}
