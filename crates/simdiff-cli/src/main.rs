//! simdiff
//!
//! Random differential testing of the symbolic semantics of x86 vector
//! instructions against the CPU.
//!
//! ```text
//! simdiff 100                 # 100 tests on every instruction
//! simdiff 20 -r=40-50 -d      # instructions 40..50, with result statistics
//! simdiff --list              # print the instruction catalog
//! ```

mod args;
mod progress;
mod report;

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use simdiff_checker::{AliveTvChecker, AliveTvConfig};
use simdiff_core::{ExecutionContext, Orchestrator, RunSummary};
use simdiff_native::{RustcCompiler, RustcConfig};
use simdiff_tracing::TracingConfig;
use tracing::{info, warn};

use crate::args::Cli;
use crate::report::{catalog_listing, CliObserver};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let mut tracing_config = TracingConfig::from_env();
    if cli.verbose {
        tracing_config = tracing_config.verbose();
    }
    if let Err(err) = simdiff_tracing::init_global_tracing(&tracing_config) {
        eprintln!("warning: logging disabled: {err}");
    }

    if cli.list {
        print!("{}", catalog_listing());
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(summary) => {
            if cli.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("ERROR: serializing summary: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("\n{summary}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.run_config();
    config.validate()?;

    let mut rustc_config = RustcConfig::from_env();
    if let Some(path) = &cli.rustc {
        rustc_config = rustc_config.with_rustc(path);
    }
    if let Some(cpu) = &cli.target_cpu {
        rustc_config = rustc_config.with_target_cpu(cpu.clone());
    }
    rustc_config.keep_artifacts = cli.keep_artifacts;
    let compiler = RustcCompiler::new(rustc_config).context("locating the native compiler")?;
    let target = compiler.detect_target().context("detecting the host target")?;

    let execution = ExecutionContext::new().context("building the execution module")?;
    let (program, verification) = execution
        .handover(&compiler, &target)
        .context("compiling the execution module")?;
    if cli.keep_artifacts {
        info!(path = %program.artifact_dir().display(), "native artifacts kept");
    }

    let mut alive_config = AliveTvConfig::from_env().with_smt_timeout_ms(cli.smt_timeout);
    if let Some(path) = &cli.alive_tv {
        alive_config = alive_config.with_path(path);
    }
    let checker = AliveTvChecker::new(alive_config).context("starting alive-tv")?;

    let mut orchestrator = Orchestrator::new(config, &program, checker, verification)?;
    let mut observer = CliObserver::new(cli.debug, std::io::stderr().is_terminal());
    let summary = orchestrator.run(&mut observer);
    observer.finish();
    let summary = summary?;

    if !summary.all_correct() {
        warn!(
            unsound = summary.counters.unsound,
            failed = summary.counters.failed,
            errors = summary.counters.errors,
            "some pairs did not verify"
        );
    }
    Ok(summary)
}
