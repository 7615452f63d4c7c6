//! # simdiff-ir
//!
//! A deliberately small SSA program representation: just enough to express
//! the synthetic functions a differential run needs and to print them as
//! LLVM textual IR.
//!
//! ```text
//!   FunctionSpec (prototype + Expr tree)
//!          │  CodegenContext::build_function
//!          ▼
//!   Function { entry: [call ..., ret ...] }  ──►  ProgramModule
//!                                                   │ Display / render_functions
//!                                                   ▼
//!                                             textual IR
//! ```
//!
//! Building is all-or-nothing: a function that fails construction or
//! verification never reaches the module.

pub mod context;
pub mod error;
pub mod expr;
pub mod function;
pub mod module;
pub mod printer;
pub mod types;
pub mod verify;

pub use context::CodegenContext;
pub use error::{IrError, Result};
pub use expr::{Expr, IntLiteral};
pub use function::{FunctionSpec, Prototype};
pub use module::{Block, Constant, Declaration, Function, Inst, Param, ProgramModule, Value};
pub use types::IrType;
pub use verify::{verify_function, verify_module};
