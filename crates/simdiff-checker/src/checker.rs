//! The equivalence checker boundary.

use simdiff_ir::ProgramModule;

use crate::verdict::{CheckCounters, Verdict};

/// Proves or refutes that two functions of a module compute the same value.
///
/// Implementations keep their own [`CheckCounters`]; every call to
/// [`compare`](EquivalenceChecker::compare) records exactly one verdict.
pub trait EquivalenceChecker {
    /// Compare `@src` against `@tgt`, both defined in `module` along with
    /// the declarations they call.
    fn compare(&mut self, module: &ProgramModule, src: &str, tgt: &str) -> Verdict;

    fn counters(&self) -> &CheckCounters;

    /// Short backend name for logs.
    fn name(&self) -> &str;
}

impl<C: EquivalenceChecker + ?Sized> EquivalenceChecker for Box<C> {
    fn compare(&mut self, module: &ProgramModule, src: &str, tgt: &str) -> Verdict {
        (**self).compare(module, src, tgt)
    }

    fn counters(&self) -> &CheckCounters {
        (**self).counters()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
