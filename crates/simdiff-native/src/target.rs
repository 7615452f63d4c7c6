//! Target machine description and host detection.

use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{NativeError, Result};

/// Where native code runs: a target triple plus an optional CPU name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetDescription {
    pub triple: String,
    pub cpu: Option<String>,
}

impl TargetDescription {
    pub fn new(triple: impl Into<String>, cpu: Option<String>) -> Self {
        Self {
            triple: triple.into(),
            cpu,
        }
    }

    /// Ask `rustc` for its host triple.
    ///
    /// Fails unless the host is x86-64, the only architecture whose
    /// instructions the catalog describes.
    pub fn detect(rustc: &Path) -> Result<Self> {
        if !cfg!(target_arch = "x86_64") {
            return Err(NativeError::TargetDetection(format!(
                "host architecture {} cannot execute x86-64 vector instructions",
                std::env::consts::ARCH
            )));
        }

        let output = Command::new(rustc)
            .arg("-vV")
            .output()
            .map_err(|err| NativeError::TargetDetection(format!("running {}: {err}", rustc.display())))?;
        if !output.status.success() {
            return Err(NativeError::TargetDetection(format!(
                "{} -vV exited with {}",
                rustc.display(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let triple = parse_host_triple(&stdout)
            .ok_or_else(|| NativeError::TargetDetection("no host line in rustc -vV output".to_string()))?;
        if !triple.starts_with("x86_64") {
            return Err(NativeError::TargetDetection(format!("unsupported host triple {triple}")));
        }

        debug!(triple = %triple, "detected native target");
        Ok(Self::new(triple, None))
    }

    pub fn with_cpu(mut self, cpu: impl Into<String>) -> Self {
        self.cpu = Some(cpu.into());
        self
    }
}

impl fmt::Display for TargetDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cpu {
            Some(cpu) => write!(f, "{} ({cpu})", self.triple),
            None => f.write_str(&self.triple),
        }
    }
}

pub(crate) fn parse_host_triple(version_output: &str) -> Option<String> {
    version_output
        .lines()
        .find_map(|line| line.strip_prefix("host:"))
        .map(|triple| triple.trim().to_string())
        .filter(|triple| !triple.is_empty())
}
