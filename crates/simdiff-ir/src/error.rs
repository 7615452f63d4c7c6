//! Error types for program construction

use thiserror::Error;

use crate::types::IrType;

/// Failures while building or verifying a synthetic function.
///
/// All of these mean the caller asked for a program that cannot exist (a
/// catalog or shape mismatch); the function under construction is discarded
/// and must not be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IrError {
    #[error("Unknown variable name: {0}")]
    UnknownVariable(String),

    #[error("Unknown function referenced: {0}")]
    UnknownCallee(String),

    #[error("Incorrect number of arguments passed to {callee}: expected {expected}, got {actual}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        actual: usize,
    },

    #[error("Type mismatch in {context}: expected {expected}, found {actual}")]
    TypeMismatch {
        context: String,
        expected: IrType,
        actual: IrType,
    },

    #[error("Function {0} already exists in module")]
    DuplicateFunction(String),

    #[error("Conflicting declaration of {0}")]
    ConflictingDeclaration(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Malformed function {function}: {reason}")]
    MalformedFunction { function: String, reason: String },
}

impl IrError {
    pub fn type_mismatch(context: impl Into<String>, expected: IrType, actual: IrType) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    pub fn malformed(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedFunction {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IrError>;
