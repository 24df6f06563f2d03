//! Exit code logic for the export process.
//!
//! Single responsibility: map archived/failed item counts to the process exit outcome.

use crate::ProcessExit;

/// Determines the process exit outcome from archived and failed item counts.
pub(crate) fn determine_exit_outcome(archived: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if archived > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
