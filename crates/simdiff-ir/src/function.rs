//! Function requests: what the builder is asked to produce.

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::types::IrType;

/// Name and signature of a function. Parameters are named positionally
/// `i0`, `i1`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prototype {
    pub name: String,
    pub ret: IrType,
    pub params: Vec<IrType>,
}

impl Prototype {
    pub fn new(name: impl Into<String>, ret: IrType, params: Vec<IrType>) -> Self {
        Self {
            name: name.into(),
            ret,
            params,
        }
    }

    pub fn param_name(index: usize) -> String {
        format!("i{index}")
    }

    pub fn param_names(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.params.len()).map(Self::param_name)
    }
}

/// A prototype plus the expression its body evaluates and returns.
///
/// Variables referenced in `body` must be the prototype's parameter names,
/// typed as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub prototype: Prototype,
    pub body: Expr,
}

impl FunctionSpec {
    pub fn new(prototype: Prototype, body: Expr) -> Self {
        Self { prototype, body }
    }

    pub fn name(&self) -> &str {
        &self.prototype.name
    }
}
