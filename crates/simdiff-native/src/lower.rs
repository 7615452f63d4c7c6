//! Lowering an execution module to Rust source for a `cdylib`.
//!
//! Every defined function becomes an exported wrapper with one uniform C
//! ABI, regardless of its IR signature:
//!
//! ```text
//! unsafe extern "C" fn func0(inputs: *const *const u8, output: *mut u8)
//! ```
//!
//! `inputs[i]` points at the native bytes of parameter `i` and `output` at a
//! buffer large enough for the return value. Each call to an `llvm.x86.*`
//! symbol is replaced by the `core::arch` function realising that
//! instruction, compiled under the instruction's `target_feature`s.

use std::collections::BTreeSet;
use std::fmt::Write;

use simdiff_ir::{Function, Inst, IrType, ProgramModule, Value};
use simdiff_isa::{Intrinsic, Shape};

use crate::error::{NativeError, Result};

/// Signature of an exported wrapper, in shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Shape>,
    pub ret: Shape,
}

/// One exported wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredFunction {
    pub name: String,
    pub signature: Signature,
    pub features: Vec<&'static str>,
}

/// Source text of the library plus what it exports.
#[derive(Debug, Clone)]
pub struct LoweredModule {
    pub source: String,
    pub functions: Vec<LoweredFunction>,
}

/// Turns [`ProgramModule`]s into `cdylib` source.
pub struct DylibLowering;

impl DylibLowering {
    pub fn new() -> Self {
        Self
    }

    pub fn lower(&self, module: &ProgramModule) -> Result<LoweredModule> {
        let mut source = String::new();
        source.push_str("// Generated execution wrappers. Do not edit.\n");
        source.push_str("#![allow(unused_unsafe, non_snake_case, unused_imports)]\n\n");
        source.push_str("use core::arch::x86_64::*;\n");
        source.push_str("use core::ptr::{read_unaligned, write_unaligned};\n");

        let mut functions = Vec::with_capacity(module.function_count());
        for function in module.functions() {
            let (code, lowered) = self.lower_function(function)?;
            source.push('\n');
            source.push_str(&code);
            functions.push(lowered);
        }

        Ok(LoweredModule { source, functions })
    }

    fn lower_function(&self, function: &Function) -> Result<(String, LoweredFunction)> {
        let name = function.name();
        let params = function
            .params()
            .iter()
            .map(|param| shape_of(name, param.ty))
            .collect::<Result<Vec<_>>>()?;
        let ret = shape_of(name, function.ret_type())?;

        let mut features = BTreeSet::new();
        let mut body = String::new();
        for (index, param) in function.params().iter().enumerate() {
            let rust_ty = rust_type(params[index]);
            writeln!(
                body,
                "    let {}: {rust_ty} = read_unaligned(*inputs.add({index}) as *const {rust_ty});",
                param.name
            )
            .map_err(|_| NativeError::unsupported(name, "formatting failed"))?;
        }

        let mut returned = None;
        for inst in function.blocks().iter().flat_map(|block| &block.insts) {
            match inst {
                Inst::Call { dest, ty, callee, args } => {
                    let intrinsic = Intrinsic::from_symbol(callee)
                        .map_err(|_| NativeError::unsupported(name, format!("no native realisation of @{callee}")))?;
                    features.extend(intrinsic.features().iter().copied());
                    let call = native_call(name, intrinsic, args)?;
                    let dest_ty = rust_type(shape_of(name, *ty)?);
                    writeln!(body, "    let {dest}: {dest_ty} = {call};")
                        .map_err(|_| NativeError::unsupported(name, "formatting failed"))?;
                }
                Inst::Ret(value) => returned = Some(value),
            }
        }

        let returned = returned.ok_or_else(|| NativeError::unsupported(name, "missing ret"))?;
        let ret_ty = rust_type(ret);
        writeln!(
            body,
            "    write_unaligned(output as *mut {ret_ty}, {});",
            operand(name, returned)?
        )
        .map_err(|_| NativeError::unsupported(name, "formatting failed"))?;

        let features: Vec<&'static str> = features.into_iter().collect();
        let mut code = String::new();
        code.push_str("#[no_mangle]\n");
        if !features.is_empty() {
            code.push_str(&format!("#[target_feature(enable = \"{}\")]\n", features.join(",")));
        }
        code.push_str(&format!(
            "pub unsafe extern \"C\" fn {name}(inputs: *const *const u8, output: *mut u8) {{\n"
        ));
        code.push_str(&body);
        code.push_str("}\n");

        Ok((
            code,
            LoweredFunction {
                name: name.to_string(),
                signature: Signature { params, ret },
                features,
            },
        ))
    }
}

impl Default for DylibLowering {
    fn default() -> Self {
        Self::new()
    }
}

fn native_call(function: &str, intrinsic: Intrinsic, args: &[Value]) -> Result<String> {
    if args.len() != 2 {
        return Err(NativeError::unsupported(
            function,
            format!("{} takes 2 operands, got {}", intrinsic.name(), args.len()),
        ));
    }
    let first = operand(function, &args[0])?;
    let second = operand(function, &args[1])?;
    // Scalar shift counts travel in the low 32 bits of an xmm register.
    let second = if intrinsic.has_scalar_operand() {
        format!("_mm_cvtsi32_si128({second})")
    } else {
        second
    };
    Ok(format!("{}({first}, {second})", intrinsic.native_fn()))
}

fn operand(function: &str, value: &Value) -> Result<String> {
    match value {
        Value::Local { name, .. } => Ok(name.clone()),
        Value::Const(_) => Err(NativeError::unsupported(
            function,
            "constant operands are not lowered; pass them as parameters",
        )),
    }
}

fn shape_of(function: &str, ty: IrType) -> Result<Shape> {
    match ty {
        IrType::Int { bits: 32 } => Ok(Shape::Scalar32),
        IrType::Vector { lanes, elem_bits } => Shape::from_lanes(lanes, elem_bits)
            .map_err(|err| NativeError::unsupported(function, format!("type {ty}: {err}"))),
        other => Err(NativeError::unsupported(function, format!("type {other}"))),
    }
}

fn rust_type(shape: Shape) -> &'static str {
    match shape.bit_size() {
        32 => "i32",
        128 => "__m128i",
        256 => "__m256i",
        _ => "__m512i",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simdiff_ir::{CodegenContext, Expr, FunctionSpec, Prototype};
    use simdiff_isa::Operand;

    fn wrapper_module(names: &[&str]) -> ProgramModule {
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

    #[test]
    fn lowers_vector_wrapper() {
        let lowered = DylibLowering::new().lower(&wrapper_module(&["sse2_pavg_w"])).unwrap();
        let code = &lowered.source;
        assert!(code.contains("#[no_mangle]\n#[target_feature(enable = \"sse2\")]\n"));
        assert!(code.contains("pub unsafe extern \"C\" fn func0(inputs: *const *const u8, output: *mut u8) {"));
        assert!(code.contains("let i0: __m128i = read_unaligned(*inputs.add(0) as *const __m128i);"));
        assert!(code.contains("let calltmp: __m128i = _mm_avg_epu16(i0, i1);"));
        assert!(code.contains("write_unaligned(output as *mut __m128i, calltmp);"));

        let function = &lowered.functions[0];
        assert_eq!(function.name, "func0");
        assert_eq!(function.features, vec!["sse2"]);
        assert_eq!(function.signature.params.len(), 2);
    }

    #[test]
    fn scalar_counts_are_moved_into_a_register() {
        let lowered = DylibLowering::new().lower(&wrapper_module(&["avx2_psrli_d"])).unwrap();
        assert!(lowered.source.contains("let i1: i32 = read_unaligned(*inputs.add(1) as *const i32);"));
        assert!(lowered
            .source
            .contains("let calltmp: __m256i = _mm256_srl_epi32(i0, _mm_cvtsi32_si128(i1));"));
        assert_eq!(lowered.functions[0].signature.params[1], Shape::Scalar32);
    }

    #[test]
    fn combined_features_are_listed_once() {
        let lowered = DylibLowering::new()
            .lower(&wrapper_module(&["avx512_psrav_w_128"]))
            .unwrap();
        assert!(lowered
            .source
            .contains("#[target_feature(enable = \"avx512bw,avx512vl\")]"));
    }

    #[test]
    fn every_catalog_entry_lowers() {
        let names: Vec<&str> = Intrinsic::all().map(Intrinsic::name).collect();
        let lowered = DylibLowering::new().lower(&wrapper_module(&names)).unwrap();
        assert_eq!(lowered.functions.len(), Intrinsic::COUNT);
        for intrinsic in Intrinsic::all() {
            assert!(lowered.source.contains(intrinsic.native_fn()), "{intrinsic}");
        }
    }

    #[test]
    fn constant_operands_are_rejected() {
        let mut ctx = CodegenContext::new("exec");
        let ty = IrType::vector(8, 16);
        ctx.declare("llvm.x86.sse2.pavg.w", ty, vec![ty, ty]).unwrap();
        ctx.build_function(FunctionSpec::new(
            Prototype::new("src", ty, vec![]),
            Expr::call("llvm.x86.sse2.pavg.w", vec![Expr::vector(16, [1; 8]), Expr::vector(16, [3; 8])]),
        ))
        .unwrap();
        let err = DylibLowering::new().lower(ctx.module()).unwrap_err();
        assert!(matches!(err, NativeError::Unsupported { .. }));
    }
}
