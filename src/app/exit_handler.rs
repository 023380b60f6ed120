//! Exit code logic for the compiler process.
//!
//! Single responsibility: map a finished run to the process exit outcome.

use aip_core::CompileReport;

use crate::ProcessExit;

/// A written compilation is a success unless `--strict` asks for every part.
pub(crate) fn determine_exit_outcome(report: &CompileReport, strict: bool) -> ProcessExit {
    if strict && !report.is_complete() {
        ProcessExit::Partial
    } else {
        ProcessExit::Success
    }
}
