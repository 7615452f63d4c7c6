//! Program modules and the SSA form functions are lowered into.

use std::collections::BTreeMap;

use crate::error::{IrError, Result};
use crate::types::IrType;

/// A compile-time constant operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Int { bits: u32, value: i64 },
    Vector { elem_bits: u32, elements: Vec<i64> },
}

impl Constant {
    pub fn ty(&self) -> IrType {
        match self {
            Constant::Int { bits, .. } => IrType::int(*bits),
            Constant::Vector { elem_bits, elements } => IrType::vector(elements.len() as u32, *elem_bits),
        }
    }
}

/// An instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Const(Constant),
    /// A parameter or instruction result, referenced by name.
    Local { name: String, ty: IrType },
}

impl Value {
    pub fn ty(&self) -> IrType {
        match self {
            Value::Const(constant) => constant.ty(),
            Value::Local { ty, .. } => *ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    Call {
        dest: String,
        ty: IrType,
        callee: String,
        args: Vec<Value>,
    },
    Ret(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub label: String,
    pub insts: Vec<Inst>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: IrType,
}

/// A fully built, verified function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub(crate) name: String,
    pub(crate) ret: IrType,
    pub(crate) params: Vec<Param>,
    pub(crate) blocks: Vec<Block>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ret_type(&self) -> IrType {
        self.ret
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn param_types(&self) -> Vec<IrType> {
        self.params.iter().map(|param| param.ty).collect()
    }

    /// The value returned from the entry block.
    pub fn returned_value(&self) -> Option<&Value> {
        self.blocks.first()?.insts.iter().find_map(|inst| match inst {
            Inst::Ret(value) => Some(value),
            _ => None,
        })
    }

    /// Callees in order of first call.
    pub fn callees(&self) -> Vec<&str> {
        let mut callees: Vec<&str> = Vec::new();
        for inst in self.blocks.iter().flat_map(|block| &block.insts) {
            if let Inst::Call { callee, .. } = inst {
                if !callees.contains(&callee.as_str()) {
                    callees.push(callee);
                }
            }
        }
        callees
    }
}

/// An external symbol a module may call without defining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub ret: IrType,
    pub params: Vec<IrType>,
}

/// A named compilation unit: defined functions in insertion order plus
/// external declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramModule {
    name: String,
    target_triple: Option<String>,
    declarations: BTreeMap<String, Declaration>,
    functions: Vec<Function>,
}

impl ProgramModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_triple: None,
            declarations: BTreeMap::new(),
            functions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_triple(&self) -> Option<&str> {
        self.target_triple.as_deref()
    }

    pub fn set_target_triple(&mut self, triple: impl Into<String>) {
        self.target_triple = Some(triple.into());
    }

    /// Declare an external function. Redeclaring with the same signature is
    /// a no-op; a different signature is an error.
    pub fn declare(&mut self, declaration: Declaration) -> Result<()> {
        if self.functions.iter().any(|function| function.name == declaration.name) {
            return Err(IrError::ConflictingDeclaration(declaration.name));
        }
        match self.declarations.get(&declaration.name) {
            Some(existing) if *existing == declaration => Ok(()),
            Some(_) => Err(IrError::ConflictingDeclaration(declaration.name)),
            None => {
                self.declarations.insert(declaration.name.clone(), declaration);
                Ok(())
            }
        }
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        self.declarations.contains_key(name) || self.function(name).is_some()
    }

    /// Signature `(ret, params)` of a defined or declared callee.
    pub fn signature_of(&self, name: &str) -> Option<(IrType, Vec<IrType>)> {
        if let Some(function) = self.function(name) {
            return Some((function.ret, function.param_types()));
        }
        self.declarations
            .get(name)
            .map(|declaration| (declaration.ret, declaration.params.clone()))
    }

    pub(crate) fn insert_function(&mut self, function: Function) -> Result<()> {
        if self.contains_symbol(&function.name) {
            return Err(IrError::DuplicateFunction(function.name));
        }
        self.functions.push(function);
        Ok(())
    }

    /// Remove a defined function, returning it.
    pub fn erase_function(&mut self, name: &str) -> Option<Function> {
        let index = self.functions.iter().position(|function| function.name == name)?;
        Some(self.functions.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pavg_decl() -> Declaration {
        Declaration {
            name: "llvm.x86.sse2.pavg.w".to_string(),
            ret: IrType::vector(8, 16),
            params: vec![IrType::vector(8, 16); 2],
        }
    }

    #[test]
    fn redeclaring_same_signature_is_idempotent() {
        let mut module = ProgramModule::new("m");
        module.declare(pavg_decl()).unwrap();
        module.declare(pavg_decl()).unwrap();
        assert_eq!(module.declarations().count(), 1);
    }

    #[test]
    fn conflicting_declaration_is_rejected() {
        let mut module = ProgramModule::new("m");
        module.declare(pavg_decl()).unwrap();
        let mut other = pavg_decl();
        other.ret = IrType::vector(16, 8);
        assert_eq!(
            module.declare(other),
            Err(IrError::ConflictingDeclaration("llvm.x86.sse2.pavg.w".to_string()))
        );
    }

    #[test]
    fn signature_of_declared_symbol() {
        let mut module = ProgramModule::new("m");
        module.declare(pavg_decl()).unwrap();
        let (ret, params) = module.signature_of("llvm.x86.sse2.pavg.w").unwrap();
        assert_eq!(ret, IrType::vector(8, 16));
        assert_eq!(params.len(), 2);
        assert!(module.signature_of("missing").is_none());
    }

    #[test]
    fn constant_types() {
        let vector = Constant::Vector {
            elem_bits: 16,
            elements: vec![0; 8],
        };
        assert_eq!(vector.ty(), IrType::vector(8, 16));
        assert_eq!(Constant::Int { bits: 32, value: 1 }.ty(), IrType::I32);
    }
}
