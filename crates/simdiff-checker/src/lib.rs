//! # simdiff-checker
//!
//! The boundary to the external equivalence checker: a [`Verdict`] per
//! `src`/`tgt` pair, running [`CheckCounters`], and the
//! [`EquivalenceChecker`] trait with its `alive-tv` implementation.

pub mod alive_tv;
pub mod checker;
pub mod error;
pub mod verdict;

pub use alive_tv::{AliveTvChecker, AliveTvConfig};
pub use checker::EquivalenceChecker;
pub use error::{CheckerError, Result};
pub use verdict::{CheckCounters, Verdict};
