//! Loaded native code and typed invocation of its functions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libloading::Library;
use parking_lot::RwLock;
use simdiff_ir::ProgramModule;
use simdiff_isa::cpu::missing_features;
use simdiff_isa::{RawVectorValue, Shape};
use tempfile::TempDir;
use tracing::{debug, trace};

use crate::error::{NativeError, Result};
use crate::lower::{LoweredFunction, Signature};
use crate::target::TargetDescription;

/// Uniform ABI of every exported wrapper.
pub type EntryFn = unsafe extern "C" fn(inputs: *const *const u8, output: *mut u8);

/// Where the build artifacts live.
#[derive(Debug)]
pub enum ArtifactDir {
    /// Removed when the program is dropped.
    Temp(TempDir),
    Kept(PathBuf),
}

impl ArtifactDir {
    pub fn path(&self) -> &Path {
        match self {
            ArtifactDir::Temp(dir) => dir.path(),
            ArtifactDir::Kept(path) => path,
        }
    }
}

/// A compiled execution module, ready to run.
///
/// Owns the module it was built from, the loaded library and the directory
/// holding it.
pub struct CompiledProgram {
    // Unloaded before the artifact directory is removed.
    library: Library,
    functions: HashMap<String, LoweredFunction>,
    resolved: RwLock<HashMap<String, EntryFn>>,
    module: ProgramModule,
    target: TargetDescription,
    dir: ArtifactDir,
}

impl CompiledProgram {
    pub(crate) fn load(
        path: &Path,
        functions: Vec<LoweredFunction>,
        module: ProgramModule,
        target: TargetDescription,
        dir: ArtifactDir,
    ) -> Result<Self> {
        // SAFETY: the library was just built from generated wrappers that
        // have no initialisers.
        let library = unsafe { Library::new(path) }.map_err(NativeError::Load)?;
        debug!(path = %path.display(), functions = functions.len(), "loaded native library");
        Ok(Self {
            library,
            functions: functions
                .into_iter()
                .map(|function| (function.name.clone(), function))
                .collect(),
            resolved: RwLock::new(HashMap::new()),
            module,
            target,
            dir,
        })
    }

    pub fn module(&self) -> &ProgramModule {
        &self.module
    }

    pub fn target(&self) -> &TargetDescription {
        &self.target
    }

    pub fn artifact_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Look up an exported function by name.
    pub fn resolve(&self, name: &str) -> Result<NativeFunction<'_>> {
        let lowered = self
            .functions
            .get(name)
            .ok_or_else(|| NativeError::SymbolNotFound(name.to_string()))?;

        let cached = self.resolved.read().get(name).copied();
        let entry = match cached {
            Some(entry) => entry,
            None => {
                // SAFETY: every exported wrapper has the `EntryFn` ABI.
                let symbol = unsafe { self.library.get::<EntryFn>(name.as_bytes()) }
                    .map_err(|_| NativeError::SymbolNotFound(name.to_string()))?;
                let entry = *symbol;
                self.resolved.write().insert(name.to_string(), entry);
                trace!(function = name, "resolved native symbol");
                entry
            }
        };

        Ok(NativeFunction {
            name: &lowered.name,
            signature: &lowered.signature,
            features: &lowered.features,
            entry,
        })
    }
}

impl std::fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("functions", &self.functions.len())
            .field("target", &self.target)
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

/// A callable handle, valid while its [`CompiledProgram`] is alive.
#[derive(Clone, Copy)]
pub struct NativeFunction<'a> {
    name: &'a str,
    signature: &'a Signature,
    features: &'a [&'static str],
    entry: EntryFn,
}

impl<'a> NativeFunction<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn params(&self) -> &'a [Shape] {
        &self.signature.params
    }

    pub fn ret(&self) -> Shape {
        self.signature.ret
    }

    /// Call a two-operand function.
    pub fn invoke(&self, op0: &RawVectorValue, op1: &RawVectorValue) -> Result<RawVectorValue> {
        self.invoke_with(&[op0, op1])
    }

    /// Call with any number of operands, checked against the signature and
    /// the host CPU before control enters native code.
    pub fn invoke_with(&self, args: &[&RawVectorValue]) -> Result<RawVectorValue> {
        let params = &self.signature.params;
        if args.len() != params.len() {
            return Err(NativeError::signature_mismatch(
                self.name,
                format!("expected {} arguments, got {}", params.len(), args.len()),
            ));
        }
        for (index, (arg, shape)) in args.iter().zip(params).enumerate() {
            if !arg.fits(*shape) {
                return Err(NativeError::signature_mismatch(
                    self.name,
                    format!("argument {index} has {} bits, expected {shape}", arg.bit_size()),
                ));
            }
        }

        let missing = missing_features(self.features);
        if !missing.is_empty() {
            return Err(NativeError::UnsupportedCpu {
                function: self.name.to_string(),
                features: missing.into_iter().map(str::to_string).collect(),
            });
        }

        let inputs: Vec<*const u8> = args.iter().map(|arg| arg.as_bytes().as_ptr()).collect();
        let mut output = RawVectorValue::zeroed(self.signature.ret);
        // SAFETY: argument buffers match the parameter widths, the output
        // buffer matches the return width, and the CPU implements every
        // feature the wrapper was compiled for.
        unsafe { (self.entry)(inputs.as_ptr(), output.as_bytes_mut().as_mut_ptr()) };
        Ok(output)
    }
}

impl std::fmt::Debug for NativeFunction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("signature", self.signature)
            .finish()
    }
}
