//! Logging setup shared by the simdiff crates.
//!
//! The `simdiff` binary and the integration tests install their subscriber
//! through [`init_global_tracing`]; library crates only emit events.
//!
//! Everything is written to stderr. Stdout carries the run report: the
//! summary, IR of pairs that did not verify, and debug statistics.

pub mod performance;

#[macro_use]
pub mod macros;

use std::env;
use std::str::FromStr;

pub use tracing;
pub use tracing::{debug, error, info, trace, warn};

use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter, Registry};

const ENV_PROFILE: &str = "SIMDIFF_TRACING_PROFILE";
const ENV_DIRECTIVES: &str = "SIMDIFF_TRACING_DIRECTIVES";
const ENV_FORMAT: &str = "SIMDIFF_TRACING_FORMAT";
const ENV_PERF: &str = "SIMDIFF_PERF_TRACING";
const ENV_PERF_THRESHOLD: &str = "SIMDIFF_PERF_THRESHOLD_US";

/// Named presets selectable through `SIMDIFF_TRACING_PROFILE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TracingProfile {
    /// Terminal use next to the progress bar: compact, coloured, warnings only.
    #[default]
    Local,
    /// Log collection: JSON lines at `info`.
    Ci,
    /// Span close events and debug output from compilation and checking.
    Performance,
}

impl FromStr for TracingProfile {
    type Err = TracingSetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "ci" => Ok(Self::Ci),
            "performance" | "perf" => Ok(Self::Performance),
            other => Err(TracingSetupError::UnknownProfile(other.to_string())),
        }
    }
}

/// Formatter used for events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingOutput {
    Compact,
    Pretty,
    Json,
}

impl FromStr for TracingOutput {
    type Err = TracingSetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TracingSetupError::UnknownFormat(other.to_string())),
        }
    }
}

/// How the global subscriber is built.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    /// Filter directives such as `simdiff_checker=debug,warn`. `RUST_LOG`
    /// and then `default_directive` apply when unset.
    pub directives: Option<String>,
    pub default_directive: String,
    pub output: TracingOutput,
    pub ansi: bool,
    pub span_events: FmtSpan,
    /// Whether [`performance::PerformanceSpan`]s report at all.
    pub enable_performance_tracing: bool,
    pub performance_threshold_us: Option<u64>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_profile(TracingProfile::Local)
    }
}

impl TracingConfig {
    pub fn for_profile(profile: TracingProfile) -> Self {
        match profile {
            TracingProfile::Local => Self {
                directives: None,
                default_directive: "warn".to_string(),
                output: TracingOutput::Compact,
                ansi: true,
                span_events: FmtSpan::NONE,
                enable_performance_tracing: cfg!(debug_assertions),
                performance_threshold_us: None,
            },
            TracingProfile::Ci => Self {
                directives: None,
                default_directive: "info".to_string(),
                output: TracingOutput::Json,
                ansi: false,
                span_events: FmtSpan::NONE,
                enable_performance_tracing: false,
                performance_threshold_us: None,
            },
            TracingProfile::Performance => Self {
                directives: Some("simdiff_native=debug,simdiff_checker=debug,simdiff_tracing=debug,info".to_string()),
                default_directive: "info".to_string(),
                output: TracingOutput::Json,
                ansi: false,
                span_events: FmtSpan::CLOSE,
                enable_performance_tracing: true,
                performance_threshold_us: None,
            },
        }
    }

    pub fn for_local() -> Self {
        Self::for_profile(TracingProfile::Local)
    }

    pub fn for_ci() -> Self {
        Self::for_profile(TracingProfile::Ci)
    }

    pub fn for_performance() -> Self {
        Self::for_profile(TracingProfile::Performance)
    }

    /// Start from `SIMDIFF_TRACING_PROFILE` and apply the other
    /// `SIMDIFF_TRACING_*` / `SIMDIFF_PERF_*` overrides.
    ///
    /// Unparseable values are ignored rather than failing the run.
    pub fn from_env() -> Self {
        let profile = env_value(ENV_PROFILE)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let mut config = Self::for_profile(profile);

        if let Some(directives) = env_value(ENV_DIRECTIVES) {
            config.directives = Some(directives);
        }
        if let Some(output) = env_value(ENV_FORMAT).and_then(|value| value.parse().ok()) {
            config = config.with_output(output);
        }
        if let Some(flag) = env_value(ENV_PERF) {
            config.enable_performance_tracing = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(threshold) = env_value(ENV_PERF_THRESHOLD).and_then(|value| value.parse().ok()) {
            config.performance_threshold_us = Some(threshold);
        }
        config
    }

    /// JSON output never carries colour codes.
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        if output == TracingOutput::Json {
            self.ansi = false;
        }
        self
    }

    /// Raise the default verbosity to `debug` unless directives were given.
    pub fn verbose(mut self) -> Self {
        if self.directives.is_none() {
            self.default_directive = "debug".to_string();
        }
        self
    }

    fn filter(&self) -> Result<EnvFilter, TracingSetupError> {
        match &self.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|err| TracingSetupError::InvalidFilter(err.to_string()))
            }
            None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_directive))),
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(self.span_events.clone());
        match self.output {
            TracingOutput::Compact => Box::new(layer.compact().with_ansi(self.ansi)),
            TracingOutput::Pretty => Box::new(layer.pretty().with_ansi(self.ansi)),
            TracingOutput::Json => Box::new(layer.json().with_ansi(false)),
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum TracingSetupError {
    #[error("invalid tracing directive: {0}")]
    InvalidFilter(String),

    #[error("unknown tracing profile '{0}' (expected local, ci or performance)")]
    UnknownProfile(String),

    #[error("unknown tracing format '{0}' (expected compact, pretty or json)")]
    UnknownFormat(String),

    /// Usually means a subscriber is already installed.
    #[error("failed to install global tracing subscriber: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

pub fn build_subscriber(config: &TracingConfig) -> Result<impl Subscriber + Send + Sync, TracingSetupError> {
    let filter = config.filter()?;
    Ok(Registry::default().with(config.fmt_layer()).with(filter))
}

/// Install the subscriber process-wide and apply the performance-span
/// settings.
pub fn init_global_tracing(config: &TracingConfig) -> Result<(), TracingSetupError> {
    performance::configure(config.enable_performance_tracing, config.performance_threshold_us);
    build_subscriber(config)?.try_init()?;
    Ok(())
}
