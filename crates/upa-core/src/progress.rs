use std::path::Path;

use crate::engine::{BatchResult, OperationOutcome};

/// Observer for batch progress.
///
/// The CLI implements it with an indicatif progress bar; tests and quiet
/// callers use [`SilentReporter`]. All methods have default no-op
/// implementations.
pub trait ProgressObserver {
    fn on_batch_start(&self, _total: usize) {}
    fn on_file_start(&self, _pos: usize, _total: usize, _source: &Path) {}
    fn on_file_done(&self, _pos: usize, _total: usize, _source: &Path, _outcome: &OperationOutcome) {}
    fn on_retry_start(&self, _failed: usize) {}
    fn on_batch_done(&self, _result: &BatchResult) {}
}

/// Blocking yes/no question put to the user before an overwrite.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// No-op observer that declines every confirmation.
pub struct SilentReporter;

impl ProgressObserver for SilentReporter {}

impl Confirm for SilentReporter {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}
