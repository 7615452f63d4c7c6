//! # simdiff-core
//!
//! Differential testing of x86 vector instructions against their symbolic
//! models.
//!
//! ```text
//!   ExecutionContext ──handover──► CompiledProgram (native truth)
//!          │                             │
//!          └──► VerificationContext ◄────┘ result
//!                     │ src / tgt
//!                     ▼
//!             EquivalenceChecker ──► Verdict ──► RunSummary
//! ```
//!
//! A typical run:
//!
//! ```ignore
//! let compiler = RustcCompiler::new(RustcConfig::from_env())?;
//! let target = compiler.detect_target()?;
//! let (program, verification) = ExecutionContext::new()?.handover(&compiler, &target)?;
//! let checker = AliveTvChecker::new(AliveTvConfig::from_env())?;
//! let mut run = Orchestrator::new(RunConfig::new(100), program, checker, verification)?;
//! println!("{}", run.run(&mut SilentObserver)?);
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod random;
pub mod result_map;
pub mod session;
pub mod stats;
pub mod synth;

pub use config::{parse_range, InputStrategy, RunConfig};
pub use error::{EngineError, Result};
pub use executor::{execution_function_name, InstructionExecutor};
pub use orchestrator::{Orchestrator, RunObserver, SilentObserver};
pub use random::InputGenerator;
pub use result_map::ResultMap;
pub use session::{ExecutionContext, VerificationContext};
pub use stats::{InstructionOutcome, InstructionReport, RunSummary};
