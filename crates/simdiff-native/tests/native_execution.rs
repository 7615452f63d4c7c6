//! End-to-end native execution: lower, build with rustc, load, call.
//!
//! Skips when no usable `rustc` is available or the CPU lacks a feature.

use simdiff_ir::{CodegenContext, Expr, FunctionSpec, IrType, ProgramModule, Prototype};
use simdiff_isa::{Intrinsic, LaneWidth, Operand, RawVectorValue, Shape, VectorWidth};
use simdiff_native::{CompiledProgram, NativeCompiler, NativeError, RustcCompiler, RustcConfig};

fn execution_module(names: &[&str]) -> ProgramModule {
    let mut ctx = CodegenContext::new("exec");
    for (index, name) in names.iter().enumerate() {
        let intrinsic = Intrinsic::from_name(name).unwrap();
        let op0 = IrType::from_shape(intrinsic.shape_of(Operand::First));
        let op1 = IrType::from_shape(intrinsic.shape_of(Operand::Second));
        let ret = IrType::from_shape(intrinsic.shape_of(Operand::Result));
        ctx.declare(intrinsic.symbol(), ret, vec![op0, op1]).unwrap();
        ctx.build_function(FunctionSpec::new(
            Prototype::new(format!("func{index}"), ret, vec![op0, op1]),
            Expr::call(intrinsic.symbol(), vec![Expr::var("i0"), Expr::var("i1")]),
        ))
        .unwrap();
    }
    ctx.into_module()
}

fn compile(names: &[&str]) -> Option<CompiledProgram> {
    let compiler = match RustcCompiler::new(RustcConfig::from_env()) {
        Ok(compiler) => compiler,
        Err(err) => {
            eprintln!("skipping: {err}");
            return None;
        }
    };
    let target = match compiler.detect_target() {
        Ok(target) => target,
        Err(err) => {
            eprintln!("skipping: {err}");
            return None;
        }
    };
    Some(compiler.compile(execution_module(names), &target).unwrap())
}

const W8X16: Shape = Shape::vector(VectorWidth::V128, LaneWidth::W16);

#[test]
fn averages_unsigned_words() {
    let Some(program) = compile(&["sse2_pavg_w"]) else { return };
    let a = RawVectorValue::from_lanes(W8X16, &[1; 8]).unwrap();
    let b = RawVectorValue::from_lanes(W8X16, &[3; 8]).unwrap();
    let result = program.resolve("func0").unwrap().invoke(&a, &b).unwrap();
    assert_eq!(result.lanes(LaneWidth::W16), vec![2; 8]);
}

#[test]
fn shift_by_zero_is_identity() {
    let Some(program) = compile(&["sse2_psrli_w", "sse2_psrai_d"]) else { return };
    let lanes = [-1, 2, 3, -4, 5, 6, 7, i16::MIN as i64];
    let a = RawVectorValue::from_lanes(W8X16, &lanes).unwrap();
    let result = program
        .resolve("func0")
        .unwrap()
        .invoke(&a, &RawVectorValue::scalar(0))
        .unwrap();
    assert_eq!(result, a);
}

#[test]
fn oversized_logical_shift_clears_lanes() {
    let Some(program) = compile(&["sse2_psrli_w"]) else { return };
    let a = RawVectorValue::from_lanes(W8X16, &[-1; 8]).unwrap();
    let result = program
        .resolve("func0")
        .unwrap()
        .invoke(&a, &RawVectorValue::scalar(16))
        .unwrap();
    assert_eq!(result.lanes(LaneWidth::W16), vec![0; 8]);
}

#[test]
fn arguments_are_checked_before_the_call() {
    let Some(program) = compile(&["sse2_pavg_w"]) else { return };
    let function = program.resolve("func0").unwrap();
    let err = function
        .invoke(&RawVectorValue::scalar(1), &RawVectorValue::scalar(1))
        .unwrap_err();
    assert!(matches!(err, NativeError::SignatureMismatch { .. }));

    let zero = RawVectorValue::zeroed(W8X16);
    assert!(matches!(
        function.invoke_with(&[&zero]),
        Err(NativeError::SignatureMismatch { .. })
    ));
}

#[test]
fn unknown_functions_are_reported() {
    let Some(program) = compile(&["sse2_pavg_w"]) else { return };
    assert!(matches!(program.resolve("func7"), Err(NativeError::SymbolNotFound(_))));
    assert_eq!(program.function_count(), 1);
    assert_eq!(program.module().function_count(), 1);
}

#[test]
fn missing_cpu_features_are_reported_not_executed() {
    let intrinsic = Intrinsic::from_name("avx512_pavg_w_512").unwrap();
    if intrinsic.is_supported_on_host() {
        return;
    }
    let Some(program) = compile(&["avx512_pavg_w_512"]) else { return };
    let shape = intrinsic.shape_of(Operand::First);
    let zero = RawVectorValue::zeroed(shape);
    let err = program.resolve("func0").unwrap().invoke(&zero, &zero).unwrap_err();
    assert!(matches!(err, NativeError::UnsupportedCpu { .. }));
}
