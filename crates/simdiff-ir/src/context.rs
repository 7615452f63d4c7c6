//! Code generation into a module.
//!
//! [`CodegenContext`] owns the module being populated and the per-function
//! symbol table. Whoever holds the context decides which module receives new
//! functions; there is no process-wide "current module".

use std::collections::HashMap;

use tracing::trace;

use crate::error::{IrError, Result};
use crate::expr::{Expr, IntLiteral};
use crate::function::{FunctionSpec, Prototype};
use crate::module::{Block, Constant, Declaration, Function, Inst, Param, ProgramModule, Value};
use crate::types::IrType;
use crate::verify::{check_literal, verify_function};

pub struct CodegenContext {
    module: ProgramModule,
    /// Parameters of the function being built.
    named_values: HashMap<String, IrType>,
    /// Name of the function under construction, if any.
    in_progress: Option<String>,
}

impl CodegenContext {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self::with_module(ProgramModule::new(module_name))
    }

    pub fn with_module(module: ProgramModule) -> Self {
        Self {
            module,
            named_values: HashMap::new(),
            in_progress: None,
        }
    }

    pub fn module(&self) -> &ProgramModule {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut ProgramModule {
        &mut self.module
    }

    /// Whether no function is partially built.
    pub fn is_idle(&self) -> bool {
        self.in_progress.is_none()
    }

    /// Release the module.
    ///
    /// # Panics
    ///
    /// Panics if a function build was interrupted (a build that panicked
    /// midway), since the module could then contain a half-built body.
    pub fn into_module(self) -> ProgramModule {
        assert!(
            self.is_idle(),
            "module {} released while building {:?}",
            self.module.name(),
            self.in_progress
        );
        self.module
    }

    /// Declare an external callee such as an instruction's symbolic model.
    pub fn declare(&mut self, name: impl Into<String>, ret: IrType, params: Vec<IrType>) -> Result<()> {
        self.module.declare(Declaration {
            name: name.into(),
            ret,
            params,
        })
    }

    /// Build `spec` into the module.
    ///
    /// Steps: reserve the name, open the entry block, bind parameters,
    /// generate the body, emit `ret`, verify. The function is added to the
    /// module only after verification succeeds; on any error the module is
    /// left exactly as it was.
    pub fn build_function(&mut self, spec: FunctionSpec) -> Result<&Function> {
        let FunctionSpec { prototype, body } = spec;
        if self.module.contains_symbol(&prototype.name) {
            return Err(IrError::DuplicateFunction(prototype.name));
        }

        self.in_progress = Some(prototype.name.clone());
        let built = self.lower(prototype, &body);
        self.named_values.clear();
        self.in_progress = None;

        let function = built?;
        trace!(function = function.name(), "built function");
        let name = function.name.clone();
        self.module.insert_function(function)?;
        self.module
            .function(&name)
            .ok_or(IrError::FunctionNotFound(name))
    }

    /// Remove a function from the module.
    pub fn erase_function(&mut self, name: &str) -> Option<Function> {
        self.module.erase_function(name)
    }

    fn lower(&mut self, prototype: Prototype, body: &Expr) -> Result<Function> {
        self.named_values.clear();
        let params: Vec<Param> = prototype
            .param_names()
            .zip(&prototype.params)
            .map(|(name, ty)| Param { name, ty: *ty })
            .collect();
        for param in &params {
            self.named_values.insert(param.name.clone(), param.ty);
        }

        let mut lowering = BodyLowering {
            named_values: &self.named_values,
            module: &self.module,
            insts: Vec::new(),
            next_temp: 0,
        };
        let result = lowering.lower_expr(body)?;
        let mut insts = lowering.insts;
        insts.push(Inst::Ret(result));

        let function = Function {
            name: prototype.name,
            ret: prototype.ret,
            params,
            blocks: vec![Block {
                label: "entry".to_string(),
                insts,
            }],
        };
        verify_function(&function, &self.module)?;
        Ok(function)
    }
}

/// Lowers one expression tree into the entry block's instruction list.
struct BodyLowering<'a> {
    named_values: &'a HashMap<String, IrType>,
    module: &'a ProgramModule,
    insts: Vec<Inst>,
    next_temp: usize,
}

impl BodyLowering<'_> {
    fn lower_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::IntegerLiteral(IntLiteral { value, bits }) => {
                check_literal(*bits, *value)?;
                Ok(Value::Const(Constant::Int {
                    bits: *bits,
                    value: *value,
                }))
            }
            Expr::VectorLiteral { elem_bits, elements } => {
                if elements.is_empty() {
                    return Err(IrError::InvalidLiteral("empty vector".to_string()));
                }
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    if element.bits != *elem_bits {
                        return Err(IrError::type_mismatch(
                            "vector element",
                            IrType::int(*elem_bits),
                            IrType::int(element.bits),
                        ));
                    }
                    check_literal(element.bits, element.value)?;
                    values.push(element.value);
                }
                Ok(Value::Const(Constant::Vector {
                    elem_bits: *elem_bits,
                    elements: values,
                }))
            }
            Expr::VariableReference { name } => self
                .named_values
                .get(name)
                .map(|ty| Value::Local {
                    name: name.clone(),
                    ty: *ty,
                })
                .ok_or_else(|| IrError::UnknownVariable(name.clone())),
            Expr::Call { callee, args } => {
                let (ret, params) = self
                    .module
                    .signature_of(callee)
                    .ok_or_else(|| IrError::UnknownCallee(callee.clone()))?;
                if params.len() != args.len() {
                    return Err(IrError::ArityMismatch {
                        callee: callee.clone(),
                        expected: params.len(),
                        actual: args.len(),
                    });
                }

                let mut lowered = Vec::with_capacity(args.len());
                for (index, (arg, param)) in args.iter().zip(&params).enumerate() {
                    let value = self.lower_expr(arg)?;
                    if value.ty() != *param {
                        return Err(IrError::type_mismatch(
                            format!("argument {index} of {callee}"),
                            *param,
                            value.ty(),
                        ));
                    }
                    lowered.push(value);
                }

                let dest = self.fresh_temp();
                self.insts.push(Inst::Call {
                    dest: dest.clone(),
                    ty: ret,
                    callee: callee.clone(),
                    args: lowered,
                });
                Ok(Value::Local { name: dest, ty: ret })
            }
        }
    }

    fn fresh_temp(&mut self) -> String {
        let name = match self.next_temp {
            0 => "calltmp".to_string(),
            n => format!("calltmp{n}"),
        };
        self.next_temp += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V8X16: IrType = IrType::vector(8, 16);
    const PAVG: &str = "llvm.x86.sse2.pavg.w";

    fn context() -> CodegenContext {
        let mut ctx = CodegenContext::new("test");
        ctx.declare(PAVG, V8X16, vec![V8X16, V8X16]).unwrap();
        ctx
    }

    #[test]
    fn builds_constant_function() {
        let mut ctx = context();
        let spec = FunctionSpec::new(Prototype::new("tgt", V8X16, vec![]), Expr::vector(16, [2; 8]));
        let function = ctx.build_function(spec).unwrap();
        assert_eq!(function.name(), "tgt");
        assert_eq!(
            function.returned_value(),
            Some(&Value::Const(Constant::Vector {
                elem_bits: 16,
                elements: vec![2; 8]
            }))
        );
        assert!(ctx.is_idle());
    }

    #[test]
    fn builds_call_with_parameters() {
        let mut ctx = context();
        let spec = FunctionSpec::new(
            Prototype::new("func0", V8X16, vec![V8X16, V8X16]),
            Expr::call(PAVG, vec![Expr::var("i0"), Expr::var("i1")]),
        );
        let function = ctx.build_function(spec).unwrap();
        assert_eq!(function.params().len(), 2);
        assert_eq!(function.callees(), vec![PAVG]);
        assert_eq!(
            function.returned_value(),
            Some(&Value::Local {
                name: "calltmp".to_string(),
                ty: V8X16
            })
        );
    }

    #[test]
    fn unbound_variable_aborts_construction() {
        let mut ctx = context();
        let spec = FunctionSpec::new(
            Prototype::new("src", V8X16, vec![V8X16]),
            Expr::call(PAVG, vec![Expr::var("i0"), Expr::var("i1")]),
        );
        assert_eq!(ctx.build_function(spec).unwrap_err(), IrError::UnknownVariable("i1".to_string()));
        assert_eq!(ctx.module().function_count(), 0);
        assert!(ctx.is_idle());
    }

    #[test]
    fn undeclared_callee_aborts_construction() {
        let mut ctx = context();
        let spec = FunctionSpec::new(Prototype::new("src", V8X16, vec![]), Expr::call("llvm.x86.nope", vec![]));
        assert_eq!(
            ctx.build_function(spec).unwrap_err(),
            IrError::UnknownCallee("llvm.x86.nope".to_string())
        );
        assert_eq!(ctx.module().function_count(), 0);
    }

    #[test]
    fn arity_mismatch_aborts_construction() {
        let mut ctx = context();
        let spec = FunctionSpec::new(
            Prototype::new("src", V8X16, vec![]),
            Expr::call(PAVG, vec![Expr::vector(16, [1; 8])]),
        );
        assert_eq!(
            ctx.build_function(spec).unwrap_err(),
            IrError::ArityMismatch {
                callee: PAVG.to_string(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn argument_type_mismatch_is_reported() {
        let mut ctx = context();
        let spec = FunctionSpec::new(
            Prototype::new("src", V8X16, vec![]),
            Expr::call(PAVG, vec![Expr::vector(16, [1; 8]), Expr::int(3, 32)]),
        );
        assert!(matches!(ctx.build_function(spec), Err(IrError::TypeMismatch { .. })));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut ctx = context();
        let tgt = || FunctionSpec::new(Prototype::new("tgt", V8X16, vec![]), Expr::vector(16, [0; 8]));
        ctx.build_function(tgt()).unwrap();
        assert_eq!(
            ctx.build_function(tgt()).unwrap_err(),
            IrError::DuplicateFunction("tgt".to_string())
        );
    }

    #[test]
    fn erase_restores_function_count() {
        let mut ctx = context();
        let before = ctx.module().function_count();
        ctx.build_function(FunctionSpec::new(
            Prototype::new("tgt", V8X16, vec![]),
            Expr::vector(16, [0; 8]),
        ))
        .unwrap();
        assert!(ctx.erase_function("tgt").is_some());
        assert!(ctx.erase_function("tgt").is_none());
        assert_eq!(ctx.module().function_count(), before);
    }

    #[test]
    fn nested_calls_get_distinct_temporaries() {
        let mut ctx = context();
        let inner = Expr::call(PAVG, vec![Expr::var("i0"), Expr::var("i0")]);
        let spec = FunctionSpec::new(
            Prototype::new("twice", V8X16, vec![V8X16]),
            Expr::call(PAVG, vec![inner, Expr::var("i0")]),
        );
        let function = ctx.build_function(spec).unwrap();
        let dests: Vec<_> = function.blocks()[0]
            .insts
            .iter()
            .filter_map(|inst| match inst {
                Inst::Call { dest, .. } => Some(dest.as_str()),
                Inst::Ret(_) => None,
            })
            .collect();
        assert_eq!(dests, vec!["calltmp", "calltmp1"]);
    }
}
