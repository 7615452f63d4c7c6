//! `alive-tv` translation validation backend.
//!
//! Each comparison is written as a standalone `.ll` file holding `@src`,
//! `@tgt` and the declarations they call, then handed to `alive-tv`.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use simdiff_ir::ProgramModule;
use simdiff_tracing::perf_span;
use simdiff_tracing::performance::record_check;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::checker::EquivalenceChecker;
use crate::error::{CheckerError, Result};
use crate::verdict::{CheckCounters, Verdict};

/// Configuration for [`AliveTvChecker`].
#[derive(Debug, Clone)]
pub struct AliveTvConfig {
    /// Path to the `alive-tv` binary; looked up on `PATH` when `None`.
    pub alive_tv_path: Option<PathBuf>,
    /// SMT solver timeout in milliseconds (`--smt-to`).
    pub smt_timeout_ms: u64,
    pub extra_args: Vec<String>,
}

impl Default for AliveTvConfig {
    fn default() -> Self {
        Self {
            alive_tv_path: None,
            smt_timeout_ms: 10_000,
            extra_args: Vec::new(),
        }
    }
}

impl AliveTvConfig {
    /// Defaults, with the binary taken from `SIMDIFF_ALIVE_TV` if set.
    pub fn from_env() -> Self {
        Self {
            alive_tv_path: env::var_os("SIMDIFF_ALIVE_TV")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.alive_tv_path = Some(path.into());
        self
    }

    pub fn with_smt_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.smt_timeout_ms = timeout_ms;
        self
    }

    pub fn with_extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

/// Runs `alive-tv` as a child process per comparison.
#[derive(Debug)]
pub struct AliveTvChecker {
    binary: PathBuf,
    config: AliveTvConfig,
    workdir: TempDir,
    counters: CheckCounters,
}

impl AliveTvChecker {
    /// Locate `alive-tv` and confirm it starts.
    pub fn new(config: AliveTvConfig) -> Result<Self> {
        let binary = detect_alive_tv(&config)?;
        let workdir = tempfile::Builder::new().prefix("simdiff-alive-").tempdir()?;
        Ok(Self {
            binary,
            config,
            workdir,
            counters: CheckCounters::default(),
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, input: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg(format!("--smt-to={}", self.config.smt_timeout_ms))
            .args(&self.config.extra_args)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    fn run(&self, module: &ProgramModule, src: &str, tgt: &str) -> Verdict {
        let text = match module.render_functions(&[src, tgt]) {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "cannot render comparison pair");
                return Verdict::Errored;
            }
        };

        let input = self.workdir.path().join("pair.ll");
        if let Err(err) = std::fs::write(&input, text) {
            warn!(error = %err, path = %input.display(), "cannot write checker input");
            return Verdict::Errored;
        }

        let output = match self.command(&input).output() {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, binary = %self.binary.display(), "failed to execute alive-tv");
                return Verdict::Errored;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("alive-tv stdout: {}", stdout);
        if !stderr.is_empty() {
            debug!("alive-tv stderr: {}", stderr);
        }
        parse_output(&stdout, &stderr)
    }
}

impl EquivalenceChecker for AliveTvChecker {
    fn compare(&mut self, module: &ProgramModule, src: &str, tgt: &str) -> Verdict {
        let _span = perf_span!("equivalence_check");
        let started = Instant::now();
        let verdict = self.run(module, src, tgt);
        self.counters.record(verdict);
        record_check(src, verdict.as_str(), started.elapsed().as_micros() as u64);
        verdict
    }

    fn counters(&self) -> &CheckCounters {
        &self.counters
    }

    fn name(&self) -> &str {
        "alive-tv"
    }
}

fn detect_alive_tv(config: &AliveTvConfig) -> Result<PathBuf> {
    let binary = match &config.alive_tv_path {
        Some(path) => path.clone(),
        None => which::which("alive-tv")
            .map_err(|_| CheckerError::NotFound("alive-tv is not on PATH; set SIMDIFF_ALIVE_TV".to_string()))?,
    };

    let output = Command::new(&binary)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .map_err(|err| CheckerError::NotRunnable(format!("{}: {err}", binary.display())))?;

    // Some builds print their version to stderr and exit non-zero.
    let version = if output.status.success() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !stderr.to_ascii_lowercase().contains("alive") {
            return Err(CheckerError::NotRunnable(format!(
                "{} --version exited with {}",
                binary.display(),
                output.status
            )));
        }
        stderr
    };
    debug!("Detected alive-tv: {}", version.trim());
    Ok(binary)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    correct: u64,
    incorrect: u64,
    failed: u64,
    errors: u64,
}

fn parse_summary(stdout: &str) -> Option<Summary> {
    let mut summary = Summary::default();
    let mut seen = false;
    for line in stdout.lines() {
        let line = line.trim();
        let Some((count, rest)) = line.split_once(' ') else {
            continue;
        };
        let Ok(count) = count.parse::<u64>() else {
            continue;
        };
        let slot = match rest.trim() {
            "correct transformations" => &mut summary.correct,
            "incorrect transformations" => &mut summary.incorrect,
            "failed-to-prove transformations" => &mut summary.failed,
            "Alive2 errors" => &mut summary.errors,
            _ => continue,
        };
        *slot = count;
        seen = true;
    }
    seen.then_some(summary)
}

/// Map an `alive-tv` report to a verdict.
///
/// The trailing summary block decides when present; otherwise the
/// per-transformation messages are scanned.
pub(crate) fn parse_output(stdout: &str, stderr: &str) -> Verdict {
    if let Some(summary) = parse_summary(stdout) {
        return if summary.incorrect > 0 {
            Verdict::Unsound
        } else if summary.errors > 0 {
            Verdict::Errored
        } else if summary.failed > 0 {
            Verdict::Failed
        } else if summary.correct > 0 {
            Verdict::Correct
        } else {
            Verdict::Errored
        };
    }

    let combined = format!("{stdout}\n{stderr}");
    if combined.contains("Transformation doesn't verify!") {
        Verdict::Unsound
    } else if combined.contains("ERROR: Timeout") || combined.contains("ERROR: SMT Error") {
        Verdict::Failed
    } else if combined.contains("Transformation seems to be correct!") {
        Verdict::Correct
    } else {
        Verdict::Errored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORRECT: &str = "\
----------------------------------------
define <8 x i16> @src() {
entry:
  %calltmp = call <8 x i16> @llvm.x86.sse2.pavg.w(<8 x i16> { 1, 1, 1, 1, 1, 1, 1, 1 }, <8 x i16> { 3, 3, 3, 3, 3, 3, 3, 3 })
  ret <8 x i16> %calltmp
}
=>
define <8 x i16> @tgt() {
entry:
  ret <8 x i16> { 2, 2, 2, 2, 2, 2, 2, 2 }
}
Transformation seems to be correct!

Summary:
  1 correct transformations
  0 incorrect transformations
  0 failed-to-prove transformations
  0 Alive2 errors
";

    const UNSOUND: &str = "\
Transformation doesn't verify!

ERROR: Value mismatch

Example:

Source:
<8 x i16> %calltmp = < #x0001, ... >

Summary:
  0 correct transformations
  1 incorrect transformations
  0 failed-to-prove transformations
  0 Alive2 errors
";

    const TIMEOUT: &str = "\
ERROR: Timeout

Summary:
  0 correct transformations
  0 incorrect transformations
  1 failed-to-prove transformations
  0 Alive2 errors
";

    #[test]
    fn parses_summary_block() {
        assert_eq!(
            parse_summary(CORRECT),
            Some(Summary {
                correct: 1,
                ..Summary::default()
            })
        );
        assert_eq!(parse_summary("no summary here"), None);
    }

    #[test]
    fn maps_reports_to_verdicts() {
        assert_eq!(parse_output(CORRECT, ""), Verdict::Correct);
        assert_eq!(parse_output(UNSOUND, ""), Verdict::Unsound);
        assert_eq!(parse_output(TIMEOUT, ""), Verdict::Failed);
    }

    #[test]
    fn errors_in_summary_win_over_failures() {
        let report = "Summary:\n  0 correct transformations\n  0 incorrect transformations\n  \
                      1 failed-to-prove transformations\n  1 Alive2 errors\n";
        assert_eq!(parse_output(report, ""), Verdict::Errored);
    }

    #[test]
    fn falls_back_to_messages_without_summary() {
        assert_eq!(parse_output("Transformation seems to be correct!\n", ""), Verdict::Correct);
        assert_eq!(parse_output("", "Transformation doesn't verify!\n"), Verdict::Unsound);
        assert_eq!(parse_output("ERROR: Timeout\n", ""), Verdict::Failed);
        assert_eq!(parse_output("", "ERROR: Could not translate 'src'\n"), Verdict::Errored);
        assert_eq!(parse_output("", ""), Verdict::Errored);
    }

    #[test]
    fn config_builders() {
        let config = AliveTvConfig::default()
            .with_path("/opt/alive2/alive-tv")
            .with_smt_timeout_ms(2_000)
            .with_extra_arg("--disable-undef-input");
        assert_eq!(config.alive_tv_path, Some(PathBuf::from("/opt/alive2/alive-tv")));
        assert_eq!(config.smt_timeout_ms, 2_000);
        assert_eq!(config.extra_args, vec!["--disable-undef-input"]);
    }

    #[test]
    fn missing_binary_is_reported() {
        let config = AliveTvConfig::default().with_path("/nonexistent/alive-tv");
        assert!(matches!(AliveTvChecker::new(config), Err(CheckerError::NotRunnable(_))));
    }
}
