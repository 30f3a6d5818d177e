//! The file collaborator the filter pipeline and batch engine drive.
//!
//! Every call reports failure as a [`ServiceError`] value, so callers can
//! classify outcomes by matching instead of unwinding.

mod local;

pub use local::LocalMediaService;

use chrono::{DateTime, Local};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("File not found \"{}\"", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file \"{}\"", .0.display())]
    NotAFile(PathBuf),

    #[error("Unsupported file format \"{}\"", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("{message} \"{}\"", .path.display())]
    Io { path: PathBuf, message: String },
}

impl ServiceError {
    pub(crate) fn io(path: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return ServiceError::NotFound(path.to_path_buf());
        }
        ServiceError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// True when the error means the path itself is absent or not a file.
    pub fn is_missing(&self) -> bool {
        matches!(self, ServiceError::NotFound(_) | ServiceError::NotAFile(_))
    }
}

/// Media file primitives: existence checks, listing, metadata and the
/// mutating copy/move/remove/mkdir operations.
///
/// Mutating calls are only ever issued by the batch engine, and never when
/// the engine runs in dry-run mode.
pub trait MediaFileService {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// True when both paths name the same file, however they are spelled
    /// (relative, `..` components, symlinks).
    fn same_file(&self, a: &Path, b: &Path) -> bool;

    /// Files below `dir` whose file name matches `pattern`. Descends into
    /// subdirectories only when `recursive` is set.
    fn list_files(
        &self,
        dir: &Path,
        recursive: bool,
        pattern: &Regex,
    ) -> Result<Vec<PathBuf>, ServiceError>;

    fn supported_extensions(&self) -> &[String];

    /// Extension of an existing file, case preserved.
    fn extension_of(&self, path: &Path) -> Result<String, ServiceError>;

    fn creation_time(&self, path: &Path) -> Result<DateTime<Local>, ServiceError>;

    fn copy(&self, source: &Path, target: &Path) -> Result<(), ServiceError>;
    fn move_file(&self, source: &Path, target: &Path) -> Result<(), ServiceError>;
    /// Removing a path that does not exist succeeds.
    fn remove(&self, path: &Path) -> Result<(), ServiceError>;
    fn make_directories(&self, path: &Path) -> Result<(), ServiceError>;
}
