//! Error types for the native execution adapter

use simdiff_ir::IrError;
use simdiff_isa::IsaError;
use thiserror::Error;

/// Failures compiling, loading or calling native code.
///
/// Every variant except [`NativeError::UnsupportedCpu`] leaves the run
/// without an execution path and is treated as fatal by callers.
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Target detection failed: {0}")]
    TargetDetection(String),

    #[error("Cannot lower {function}: {reason}")]
    Unsupported { function: String, reason: String },

    #[error("Compilation failed: {0}")]
    Compilation(String),

    #[error("Failed to load compiled library: {0}")]
    Load(#[source] libloading::Error),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Signature mismatch calling {function}: {reason}")]
    SignatureMismatch { function: String, reason: String },

    #[error("CPU lacks {features:?} required by {function}")]
    UnsupportedCpu { function: String, features: Vec<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Isa(#[from] IsaError),
}

impl NativeError {
    pub fn unsupported(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            function: function.into(),
            reason: reason.into(),
        }
    }

    pub fn signature_mismatch(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SignatureMismatch {
            function: function.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NativeError>;
