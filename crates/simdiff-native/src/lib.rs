//! Native execution of x86 vector instructions.
//!
//! An execution module (one `funcN(i0, i1)` wrapper per instruction, each
//! calling its `llvm.x86.*` symbol) is lowered to Rust source calling the
//! matching `core::arch::x86_64` intrinsic, built as a `cdylib` with
//! `rustc`, and loaded with `libloading`.
//!
//! ```ignore
//! let compiler = RustcCompiler::new(RustcConfig::from_env())?;
//! let target = compiler.detect_target()?;
//! let program = compiler.compile(module, &target)?;
//! let result = program.resolve("func0")?.invoke(&a, &b)?;
//! ```

pub mod compiler;
pub mod error;
pub mod lower;
pub mod program;
pub mod target;

pub use compiler::{NativeCompiler, RustcCompiler, RustcConfig};
pub use error::{NativeError, Result};
pub use lower::{DylibLowering, LoweredFunction, LoweredModule, Signature};
pub use program::{ArtifactDir, CompiledProgram, EntryFn, NativeFunction};
pub use target::TargetDescription;
