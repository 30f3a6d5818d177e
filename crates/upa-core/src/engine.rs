use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::policy::{IoPolicy, OperationKind};
use crate::progress::{Confirm, ProgressObserver};
use crate::service::{MediaFileService, ServiceError};

/// Classification of one file's operation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOutcome {
    Succeeded,
    SkippedByPolicy,
    SkippedBySourceEqualsTarget,
    FailedSourceMissing,
    FailedTargetRemovalFailed,
    FailedUnderlyingOperation,
}

impl OperationOutcome {
    /// Counted towards the succeeded total. A no-op on identical paths is a success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OperationOutcome::Succeeded | OperationOutcome::SkippedBySourceEqualsTarget
        )
    }

    /// Eligible for the retry pass.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            OperationOutcome::FailedSourceMissing
                | OperationOutcome::FailedTargetRemovalFailed
                | OperationOutcome::FailedUnderlyingOperation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub kind: OperationKind,
    pub total: usize,
    pub succeeded: usize,
    /// Files left alone because an existing target was not to be overwritten.
    pub skipped: Vec<PathBuf>,
    /// Files still failing after the retry pass, in candidate order.
    pub failed: Vec<(PathBuf, OperationOutcome)>,
}

impl BatchResult {
    fn empty(kind: OperationKind, total: usize) -> Self {
        Self {
            kind,
            total,
            succeeded: 0,
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    fn record(&mut self, source: &Path, outcome: OperationOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else if outcome.is_failure() {
            self.failed.push((source.to_path_buf(), outcome));
        } else {
            self.skipped.push(source.to_path_buf());
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `[pos/total]: text`, with both numbers padded to the width of `total`.
pub fn progress_message(pos: usize, total: usize, text: &str) -> String {
    let width = total.to_string().len();
    format!("[{:>width$}/{:>width$}]: {}", pos, total, text, width = width)
}

/// Applies one operation kind across a candidate list, strictly in order.
///
/// Collaborator failures never escape [`BatchEngine::run`]; each is turned
/// into an [`OperationOutcome`]. Under `dry_run` no mutating collaborator
/// call is made but every check and prompt still happens.
pub struct BatchEngine<'a, S: ?Sized> {
    service: &'a S,
    policy: IoPolicy,
}

impl<'a, S> BatchEngine<'a, S>
where
    S: MediaFileService + ?Sized,
{
    pub fn new(service: &'a S, policy: IoPolicy) -> Self {
        Self { service, policy }
    }

    /// Make sure the target directory exists, creating it when allowed.
    pub fn prepare_target(&self, target: &Path) -> Result<(), Error> {
        if self.service.is_dir(target) {
            return Ok(());
        }
        if self.service.exists(target) || !self.policy.create_directories {
            return Err(Error::TargetDirectoryNotFound(target.to_path_buf()));
        }
        if !self.policy.dry_run {
            self.service
                .make_directories(target)
                .map_err(|source| Error::TargetDirectoryCreation {
                    path: target.to_path_buf(),
                    source,
                })?;
        }
        debug!("Created target directory \"{}\"", target.display());
        Ok(())
    }

    /// Run `kind` over `candidates`, then retry the failures once without
    /// prompting.
    pub fn run<R>(
        &self,
        candidates: &[PathBuf],
        kind: OperationKind,
        resolve: R,
        observer: &dyn ProgressObserver,
        prompt: &dyn Confirm,
    ) -> BatchResult
    where
        R: Fn(&Path) -> Result<PathBuf, ServiceError>,
    {
        let policy = self.policy.for_kind(kind);
        let total = candidates.len();
        observer.on_batch_start(total);

        let BatchResult {
            succeeded,
            skipped,
            failed,
            ..
        } = self.pass(candidates, kind, &resolve, &policy, false, observer, prompt);
        let mut result = BatchResult {
            kind,
            total,
            succeeded,
            skipped,
            failed: Vec::new(),
        };

        if !failed.is_empty() {
            info!("Found {} files with problems", failed.len());
            observer.on_retry_start(failed.len());

            let retry: Vec<PathBuf> = failed.into_iter().map(|(path, _)| path).collect();
            let second = self.pass(
                &retry,
                kind,
                &resolve,
                &policy.for_retry(),
                true,
                observer,
                prompt,
            );
            result.succeeded += second.succeeded;
            result.skipped.extend(second.skipped);
            result.failed = second.failed;
        }

        observer.on_batch_done(&result);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn pass<R>(
        &self,
        files: &[PathBuf],
        kind: OperationKind,
        resolve: &R,
        policy: &IoPolicy,
        silent: bool,
        observer: &dyn ProgressObserver,
        prompt: &dyn Confirm,
    ) -> BatchResult
    where
        R: Fn(&Path) -> Result<PathBuf, ServiceError>,
    {
        let total = files.len();
        let mut result = BatchResult::empty(kind, total);

        for (i, source) in files.iter().enumerate() {
            let pos = i + 1;
            if !silent {
                let label = format!("{} {}", kind.action(), source.display());
                info!("{}", progress_message(pos, total, &label));
            }
            observer.on_file_start(pos, total, source);

            let outcome = match resolve(source) {
                Ok(target) => self.apply(source, &target, kind, policy, prompt),
                Err(err) => self.unresolved(source, err),
            };

            let label = format!(
                "Finished {} {}",
                kind.action().to_lowercase(),
                source.display()
            );
            debug!("{}", progress_message(pos, total, &label));
            observer.on_file_done(pos, total, source, &outcome);
            result.record(source, outcome);
        }

        result
    }

    /// Apply `kind` to a single source/target pair under `policy`.
    pub fn apply(
        &self,
        source: &Path,
        target: &Path,
        kind: OperationKind,
        policy: &IoPolicy,
        prompt: &dyn Confirm,
    ) -> OperationOutcome {
        if self.service.same_file(source, target) {
            debug!("Equal source and target file \"{}\"", source.display());
            return OperationOutcome::SkippedBySourceEqualsTarget;
        }
        if !self.service.is_file(source) {
            warn!("File not found \"{}\"", source.display());
            return OperationOutcome::FailedSourceMissing;
        }

        if self.service.is_file(target) {
            if let Some(outcome) = self.clear_target(source, target, policy, prompt) {
                return outcome;
            }
        } else if self.service.exists(target) {
            warn!("Target exists and is not a file \"{}\"", target.display());
            return OperationOutcome::FailedUnderlyingOperation;
        }

        if let Some(outcome) = self.ensure_parent(target, policy) {
            return outcome;
        }

        debug!(
            "{} file \"{}\" to \"{}\"",
            kind.action(),
            source.display(),
            target.display()
        );
        if policy.dry_run {
            return OperationOutcome::Succeeded;
        }

        let done = match kind {
            OperationKind::Copy => self.service.copy(source, target),
            OperationKind::Move | OperationKind::Rename => self.service.move_file(source, target),
        };
        match done {
            Ok(()) => OperationOutcome::Succeeded,
            Err(err) => {
                warn!("{} file failed: {}", kind.action(), err);
                OperationOutcome::FailedUnderlyingOperation
            }
        }
    }

    /// Decide what happens to an existing target. `None` means the target is
    /// out of the way (or would be, under dry run).
    fn clear_target(
        &self,
        source: &Path,
        target: &Path,
        policy: &IoPolicy,
        prompt: &dyn Confirm,
    ) -> Option<OperationOutcome> {
        if !policy.force {
            let permitted = !policy.skip_existing
                && policy.interactive
                && prompt.confirm(&format!(
                    "Overwrite file \"{}\" with \"{}\"?",
                    target.display(),
                    source.display()
                ));
            if !permitted {
                warn!("Skipped existing target \"{}\"", target.display());
                return Some(OperationOutcome::SkippedByPolicy);
            }
        }

        debug!("Removing file \"{}\"", target.display());
        if policy.dry_run {
            return None;
        }
        match self.service.remove(target) {
            Ok(()) => None,
            Err(err) => {
                warn!("Removing file failed \"{}\": {}", target.display(), err);
                Some(OperationOutcome::FailedTargetRemovalFailed)
            }
        }
    }

    fn ensure_parent(&self, target: &Path, policy: &IoPolicy) -> Option<OperationOutcome> {
        let parent = target.parent().filter(|p| !p.as_os_str().is_empty())?;
        if self.service.is_dir(parent) {
            return None;
        }
        if !policy.create_directories {
            warn!("Target directory not found \"{}\"", parent.display());
            return Some(OperationOutcome::FailedUnderlyingOperation);
        }

        debug!("Creating directory \"{}\"", parent.display());
        if policy.dry_run {
            return None;
        }
        match self.service.make_directories(parent) {
            Ok(()) => None,
            Err(err) => {
                warn!("Creating directory failed: {}", err);
                Some(OperationOutcome::FailedUnderlyingOperation)
            }
        }
    }

    fn unresolved(&self, source: &Path, err: ServiceError) -> OperationOutcome {
        warn!("No target for \"{}\": {}", source.display(), err);
        if err.is_missing() || !self.service.is_file(source) {
            OperationOutcome::FailedSourceMissing
        } else {
            OperationOutcome::FailedUnderlyingOperation
        }
    }
}
