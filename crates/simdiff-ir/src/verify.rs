//! Structural well-formedness checks.

use std::collections::HashMap;

use crate::error::{IrError, Result};
use crate::module::{Constant, Function, Inst, ProgramModule, Value};
use crate::types::IrType;

/// Verify `function` against the callees visible in `module`.
///
/// Checks: a single `entry` block terminated by exactly one `ret` of the
/// declared type; locals defined once and before use with consistent types;
/// every call targets a known callee with matching arity and argument types;
/// every literal fits its declared width.
pub fn verify_function(function: &Function, module: &ProgramModule) -> Result<()> {
    let name = function.name();
    let malformed = |reason: String| IrError::malformed(name, reason);

    let [entry] = function.blocks() else {
        return Err(malformed(format!("expected one block, found {}", function.blocks().len())));
    };
    if entry.label != "entry" {
        return Err(malformed(format!("first block is labelled {}", entry.label)));
    }

    let mut locals: HashMap<&str, IrType> = HashMap::new();
    for param in function.params() {
        if locals.insert(&param.name, param.ty).is_some() {
            return Err(malformed(format!("parameter {} defined twice", param.name)));
        }
    }

    let Some((last, body)) = entry.insts.split_last() else {
        return Err(malformed("entry block is empty".to_string()));
    };

    for inst in body {
        match inst {
            Inst::Call { dest, ty, callee, args } => {
                for arg in args {
                    check_value(arg, &locals, name)?;
                }
                let (ret, params) = module
                    .signature_of(callee)
                    .ok_or_else(|| IrError::UnknownCallee(callee.clone()))?;
                if params.len() != args.len() {
                    return Err(IrError::ArityMismatch {
                        callee: callee.clone(),
                        expected: params.len(),
                        actual: args.len(),
                    });
                }
                for (index, (param, arg)) in params.iter().zip(args).enumerate() {
                    if *param != arg.ty() {
                        return Err(IrError::type_mismatch(format!("argument {index} of {callee}"), *param, arg.ty()));
                    }
                }
                if *ty != ret {
                    return Err(IrError::type_mismatch(format!("result of {callee}"), ret, *ty));
                }
                if locals.insert(dest, *ty).is_some() {
                    return Err(malformed(format!("%{dest} defined twice")));
                }
            }
            Inst::Ret(_) => return Err(malformed("ret before end of block".to_string())),
        }
    }

    match last {
        Inst::Ret(value) => {
            check_value(value, &locals, name)?;
            if value.ty() != function.ret_type() {
                return Err(IrError::type_mismatch(
                    format!("return of {name}"),
                    function.ret_type(),
                    value.ty(),
                ));
            }
            Ok(())
        }
        Inst::Call { .. } => Err(malformed("entry block has no terminator".to_string())),
    }
}

/// Verify every function in `module`.
pub fn verify_module(module: &ProgramModule) -> Result<()> {
    module
        .functions()
        .iter()
        .try_for_each(|function| verify_function(function, module))
}

fn check_value(value: &Value, locals: &HashMap<&str, IrType>, function: &str) -> Result<()> {
    match value {
        Value::Local { name, ty } => match locals.get(name.as_str()) {
            Some(defined) if defined == ty => Ok(()),
            Some(defined) => Err(IrError::type_mismatch(format!("use of %{name}"), *defined, *ty)),
            None => Err(IrError::malformed(function, format!("use of undefined %{name}"))),
        },
        Value::Const(constant) => check_constant(constant),
    }
}

fn check_constant(constant: &Constant) -> Result<()> {
    match constant {
        Constant::Int { bits, value } => check_literal(*bits, *value),
        Constant::Vector { elem_bits, elements } => {
            if elements.is_empty() {
                return Err(IrError::InvalidLiteral("empty vector".to_string()));
            }
            elements.iter().try_for_each(|value| check_literal(*elem_bits, *value))
        }
    }
}

/// A literal fits if it is the sign-extension of its low `bits` bits.
pub(crate) fn check_literal(bits: u32, value: i64) -> Result<()> {
    if !(1..=64).contains(&bits) {
        return Err(IrError::InvalidLiteral(format!("unsupported width i{bits}")));
    }
    let shift = 64 - bits;
    if (value << shift) >> shift != value {
        return Err(IrError::InvalidLiteral(format!("{value} does not fit in i{bits}")));
    }
    Ok(())
}
