//! Error types for the differential test engine

use simdiff_checker::CheckerError;
use simdiff_ir::IrError;
use simdiff_isa::IsaError;
use simdiff_native::NativeError;
use thiserror::Error;

/// Errors raised while driving a run.
///
/// Checker verdicts are never errors; they are tallied.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad run configuration, e.g. an instruction range outside the catalog.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A synthetic function could not be built.
    #[error("Construction failed for {instruction}: {source}")]
    Construction {
        instruction: String,
        #[source]
        source: IrError,
    },

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Isa(#[from] IsaError),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error(transparent)]
    Checker(#[from] CheckerError),
}

impl EngineError {
    pub fn construction(instruction: impl Into<String>, source: IrError) -> Self {
        Self::Construction {
            instruction: instruction.into(),
            source,
        }
    }

    /// Whether the whole run must stop.
    ///
    /// Construction problems and per-call native mismatches only abort the
    /// instruction they occur in; everything else leaves no way forward.
    pub fn is_fatal(&self) -> bool {
        match self {
            EngineError::Construction { .. } | EngineError::Isa(_) => false,
            EngineError::Native(err) => !matches!(
                err,
                NativeError::SignatureMismatch { .. } | NativeError::UnsupportedCpu { .. }
            ),
            EngineError::Config(_) | EngineError::Ir(_) | EngineError::Checker(_) => true,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_errors_are_recoverable() {
        let err = EngineError::construction("sse2_pavg_w", IrError::UnknownVariable("i2".into()));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("sse2_pavg_w"));
    }

    #[test]
    fn infrastructure_errors_are_fatal() {
        assert!(EngineError::from(NativeError::Compilation("boom".into())).is_fatal());
        assert!(EngineError::from(NativeError::SymbolNotFound("func3".into())).is_fatal());
        assert!(EngineError::from(CheckerError::NotFound("alive-tv".into())).is_fatal());
        assert!(EngineError::Config("range".into()).is_fatal());
    }

    #[test]
    fn per_call_native_errors_are_recoverable() {
        let err = EngineError::from(NativeError::UnsupportedCpu {
            function: "func5".into(),
            features: vec!["avx512bw".into()],
        });
        assert!(!err.is_fatal());
        assert!(!EngineError::from(NativeError::signature_mismatch("func0", "width")).is_fatal());
    }
}
