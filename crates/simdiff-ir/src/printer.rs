//! Textual IR rendering.
//!
//! Output follows LLVM assembly syntax so the equivalence checker can parse
//! it directly:
//!
//! ```text
//! define <8 x i16> @src() {
//! entry:
//!   %calltmp = call <8 x i16> @llvm.x86.sse2.pavg.w(<8 x i16> <i16 1, ...>, <8 x i16> <i16 3, ...>)
//!   ret <8 x i16> %calltmp
//! }
//! ```

use std::fmt::{self, Write};

use crate::error::{IrError, Result};
use crate::module::{Constant, Declaration, Function, Inst, ProgramModule, Value};

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int { value, .. } => write!(f, "{value}"),
            Constant::Vector { elem_bits, elements } => {
                f.write_char('<')?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "i{elem_bits} {element}")?;
                }
                f.write_char('>')
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Const(constant) => write!(f, "{constant}"),
            Value::Local { name, .. } => write!(f, "%{name}"),
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Call { dest, ty, callee, args } => {
                write!(f, "%{dest} = call {ty} @{callee}(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {arg}", arg.ty())?;
                }
                f.write_char(')')
            }
            Inst::Ret(value) => write!(f, "ret {} {value}", value.ty()),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "define {} @{}(", self.ret_type(), self.name())?;
        for (index, param) in self.params().iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} %{}", param.ty, param.name)?;
        }
        f.write_str(") {\n")?;
        for block in self.blocks() {
            writeln!(f, "{}:", block.label)?;
            for inst in &block.insts {
                writeln!(f, "  {inst}")?;
            }
        }
        f.write_str("}\n")
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "declare {} @{}(", self.ret, self.name)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")\n")
    }
}

impl fmt::Display for ProgramModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let functions: Vec<&Function> = self.functions().iter().collect();
        write_module(f, self, &functions)
    }
}

impl ProgramModule {
    /// Render only the named functions plus the declarations they call.
    pub fn render_functions(&self, names: &[&str]) -> Result<String> {
        let functions = names
            .iter()
            .map(|name| {
                self.function(name)
                    .ok_or_else(|| IrError::FunctionNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_module(&mut out, self, &functions);
        Ok(out)
    }
}

fn write_module(out: &mut impl Write, module: &ProgramModule, functions: &[&Function]) -> fmt::Result {
    writeln!(out, "; ModuleID = '{}'", module.name())?;
    writeln!(out, "source_filename = \"{}\"", module.name())?;
    if let Some(triple) = module.target_triple() {
        writeln!(out, "target triple = \"{triple}\"")?;
    }

    for function in functions {
        writeln!(out)?;
        write!(out, "{function}")?;
    }

    let mut callees: Vec<&str> = functions.iter().flat_map(|function| function.callees()).collect();
    callees.sort_unstable();
    callees.dedup();
    let declarations: Vec<&Declaration> = callees
        .into_iter()
        .filter_map(|callee| module.declaration(callee))
        .collect();
    if !declarations.is_empty() {
        writeln!(out)?;
        for declaration in declarations {
            write!(out, "{declaration}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::context::CodegenContext;
    use crate::expr::Expr;
    use crate::function::{FunctionSpec, Prototype};
    use crate::types::IrType;

    const V8X16: IrType = IrType::vector(8, 16);
    const PAVG: &str = "llvm.x86.sse2.pavg.w";

    fn pair() -> CodegenContext {
        let mut ctx = CodegenContext::new("verify");
        ctx.module_mut().set_target_triple("x86_64-unknown-linux-gnu");
        ctx.declare(PAVG, V8X16, vec![V8X16, V8X16]).unwrap();
        ctx.build_function(FunctionSpec::new(
            Prototype::new("src", V8X16, vec![]),
            Expr::call(PAVG, vec![Expr::vector(16, [1; 8]), Expr::vector(16, [3; 8])]),
        ))
        .unwrap();
        ctx.build_function(FunctionSpec::new(
            Prototype::new("tgt", V8X16, vec![]),
            Expr::vector(16, [2; 8]),
        ))
        .unwrap();
        ctx
    }

    #[test]
    fn renders_constant_function() {
        let ctx = pair();
        let text = ctx.module().function("tgt").unwrap().to_string();
        assert_eq!(
            text,
            "define <8 x i16> @tgt() {\n\
             entry:\n  \
             ret <8 x i16> <i16 2, i16 2, i16 2, i16 2, i16 2, i16 2, i16 2, i16 2>\n\
             }\n"
        );
    }

    #[test]
    fn renders_call_function() {
        let ctx = pair();
        let text = ctx.module().function("src").unwrap().to_string();
        assert!(text.starts_with("define <8 x i16> @src() {\nentry:\n"));
        assert!(text.contains("%calltmp = call <8 x i16> @llvm.x86.sse2.pavg.w(<8 x i16> <i16 1,"));
        assert!(text.contains("ret <8 x i16> %calltmp\n"));
    }

    #[test]
    fn renders_parameters() {
        let mut ctx = CodegenContext::new("exec");
        ctx.declare("llvm.x86.sse2.psrli.w", V8X16, vec![V8X16, IrType::I32]).unwrap();
        ctx.build_function(FunctionSpec::new(
            Prototype::new("func0", V8X16, vec![V8X16, IrType::I32]),
            Expr::call("llvm.x86.sse2.psrli.w", vec![Expr::var("i0"), Expr::var("i1")]),
        ))
        .unwrap();
        let text = ctx.module().to_string();
        assert!(text.contains("define <8 x i16> @func0(<8 x i16> %i0, i32 %i1) {"));
        assert!(text.contains("declare <8 x i16> @llvm.x86.sse2.psrli.w(<8 x i16>, i32)\n"));
    }

    #[test]
    fn subset_rendering_includes_only_needed_declarations() {
        let mut ctx = pair();
        ctx.declare("llvm.x86.unused", V8X16, vec![]).unwrap();
        let text = ctx.module().render_functions(&["src", "tgt"]).unwrap();
        assert!(text.contains("target triple = \"x86_64-unknown-linux-gnu\""));
        assert!(text.contains("@src()"));
        assert!(text.contains("@tgt()"));
        assert!(text.contains("declare <8 x i16> @llvm.x86.sse2.pavg.w(<8 x i16>, <8 x i16>)"));
        assert!(!text.contains("llvm.x86.unused"));
        assert!(ctx.module().render_functions(&["missing"]).is_err());
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(pair().module().to_string(), pair().module().to_string());
    }
}
