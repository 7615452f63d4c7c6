//! Building execution modules into loadable libraries.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use simdiff_ir::ProgramModule;
use simdiff_tracing::performance::{record_compilation, PerformanceSpan};
use tracing::{debug, info};

use crate::error::{NativeError, Result};
use crate::lower::DylibLowering;
use crate::program::{ArtifactDir, CompiledProgram};
use crate::target::TargetDescription;

const CRATE_NAME: &str = "simdiff_exec";

/// Turns a finished execution module into callable native code.
///
/// Consumes the module: once compiled, the program owns it.
pub trait NativeCompiler {
    fn compile(&self, module: ProgramModule, target: &TargetDescription) -> Result<CompiledProgram>;
}

/// Settings for [`RustcCompiler`].
#[derive(Debug, Clone)]
pub struct RustcConfig {
    /// Explicit compiler path; looked up on `PATH` when `None`.
    pub rustc_path: Option<PathBuf>,
    pub opt_level: u8,
    /// Passed as `-C target-cpu`; overrides the target's own CPU.
    pub target_cpu: Option<String>,
    /// Leave the generated source and library on disk after the run.
    pub keep_artifacts: bool,
    pub extra_args: Vec<String>,
}

impl Default for RustcConfig {
    fn default() -> Self {
        Self {
            rustc_path: None,
            opt_level: 1,
            target_cpu: None,
            keep_artifacts: false,
            extra_args: Vec::new(),
        }
    }
}

impl RustcConfig {
    /// Defaults, with the compiler taken from `SIMDIFF_RUSTC` or `RUSTC`.
    pub fn from_env() -> Self {
        let rustc_path = env::var_os("SIMDIFF_RUSTC")
            .or_else(|| env::var_os("RUSTC"))
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);
        Self {
            rustc_path,
            ..Self::default()
        }
    }

    pub fn with_rustc(mut self, path: impl Into<PathBuf>) -> Self {
        self.rustc_path = Some(path.into());
        self
    }

    pub fn with_target_cpu(mut self, cpu: impl Into<String>) -> Self {
        self.target_cpu = Some(cpu.into());
        self
    }

    pub fn with_opt_level(mut self, level: u8) -> Self {
        self.opt_level = level;
        self
    }
}

/// Compiles through `rustc --crate-type cdylib` and loads the result.
#[derive(Debug, Clone)]
pub struct RustcCompiler {
    rustc: PathBuf,
    config: RustcConfig,
}

impl RustcCompiler {
    /// Resolve the compiler binary. Fails with [`NativeError::ToolNotFound`]
    /// when none is configured and `rustc` is not on `PATH`.
    pub fn new(config: RustcConfig) -> Result<Self> {
        let rustc = match &config.rustc_path {
            Some(path) => path.clone(),
            None => which::which("rustc").map_err(|err| NativeError::ToolNotFound(format!("rustc: {err}")))?,
        };
        debug!(rustc = %rustc.display(), "using native compiler");
        Ok(Self { rustc, config })
    }

    pub fn rustc(&self) -> &Path {
        &self.rustc
    }

    pub fn config(&self) -> &RustcConfig {
        &self.config
    }

    /// Host target as reported by the configured compiler.
    pub fn detect_target(&self) -> Result<TargetDescription> {
        let target = TargetDescription::detect(&self.rustc)?;
        Ok(match &self.config.target_cpu {
            Some(cpu) => target.with_cpu(cpu.clone()),
            None => target,
        })
    }

    fn command(&self, source: &Path, output: &Path, target: &TargetDescription) -> Command {
        let mut command = Command::new(&self.rustc);
        command
            .arg("--edition")
            .arg("2021")
            .arg("--crate-type")
            .arg("cdylib")
            .arg("--crate-name")
            .arg(CRATE_NAME)
            .arg("-C")
            .arg(format!("opt-level={}", self.config.opt_level))
            .arg("--target")
            .arg(&target.triple);
        if let Some(cpu) = self.config.target_cpu.as_ref().or(target.cpu.as_ref()) {
            command.arg("-C").arg(format!("target-cpu={cpu}"));
        }
        command.args(&self.config.extra_args);
        command.arg("-o").arg(output).arg(source);
        command
    }
}

impl NativeCompiler for RustcCompiler {
    fn compile(&self, module: ProgramModule, target: &TargetDescription) -> Result<CompiledProgram> {
        let _span = PerformanceSpan::new("native_compile", None);
        let started = Instant::now();

        let lowered = DylibLowering::new().lower(&module)?;

        let dir = tempfile::Builder::new().prefix("simdiff-").tempdir()?;
        let source = dir.path().join(format!("{CRATE_NAME}.rs"));
        let library = dir
            .path()
            .join(format!("{}{CRATE_NAME}{}", env::consts::DLL_PREFIX, env::consts::DLL_SUFFIX));
        std::fs::write(&source, &lowered.source)?;

        let output = self
            .command(&source, &library, target)
            .output()
            .map_err(|err| NativeError::Compilation(format!("running {}: {err}", self.rustc.display())))?;
        if !output.status.success() {
            return Err(NativeError::Compilation(format!(
                "{} exited with {}:\n{}",
                self.rustc.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let elapsed = started.elapsed();
        record_compilation(
            lowered.functions.len(),
            lowered.source.len(),
            elapsed.as_micros() as u64,
        );
        info!(
            functions = lowered.functions.len(),
            target = %target,
            elapsed_ms = elapsed.as_millis() as u64,
            "compiled execution module"
        );

        let dir = if self.config.keep_artifacts {
            let kept = dir.into_path();
            info!(path = %kept.display(), "keeping native artifacts");
            ArtifactDir::Kept(kept)
        } else {
            ArtifactDir::Temp(dir)
        };

        CompiledProgram::load(&library, lowered.functions, module, target.clone(), dir)
    }
}
