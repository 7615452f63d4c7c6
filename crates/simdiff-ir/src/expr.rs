//! Expression trees for synthetic function bodies.
//!
//! A tree is built for exactly one function body, handed to
//! [`crate::CodegenContext::build_function`] by value and dropped once code
//! generation is done. Children are owned by their parent; nothing is shared.

use serde::{Deserialize, Serialize};
use simdiff_isa::{LaneWidth, RawVectorValue};

/// A signed integer constant of a given bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntLiteral {
    pub value: i64,
    pub bits: u32,
}

impl IntLiteral {
    pub const fn new(value: i64, bits: u32) -> Self {
        Self { value, bits }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    IntegerLiteral(IntLiteral),
    VectorLiteral { elem_bits: u32, elements: Vec<IntLiteral> },
    VariableReference { name: String },
    Call { callee: String, args: Vec<Expr> },
}

impl Expr {
    pub fn int(value: i64, bits: u32) -> Self {
        Expr::IntegerLiteral(IntLiteral::new(value, bits))
    }

    pub fn vector(elem_bits: u32, values: impl IntoIterator<Item = i64>) -> Self {
        Expr::VectorLiteral {
            elem_bits,
            elements: values.into_iter().map(|value| IntLiteral::new(value, elem_bits)).collect(),
        }
    }

    /// Literal for `value` read as lanes of `lane` bits.
    ///
    /// Scalars become an [`Expr::IntegerLiteral`]; vectors become an
    /// [`Expr::VectorLiteral`] whose elements carry the exact lane bit
    /// patterns, sign-extended.
    pub fn from_value(value: &RawVectorValue, lane: LaneWidth) -> Self {
        match value.as_scalar() {
            Some(scalar) => Expr::int(scalar as i64, 32),
            None => Expr::vector(lane.bits(), value.lanes(lane)),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::VariableReference { name: name.into() }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args,
        }
    }

    /// Names of all variables referenced anywhere in the tree, in order of
    /// first appearance.
    pub fn free_variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::VariableReference { name } => {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
            Expr::IntegerLiteral(_) | Expr::VectorLiteral { .. } => {}
        }
    }
}
