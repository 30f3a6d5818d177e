use std::path::PathBuf;

use thiserror::Error;

use crate::service::ServiceError;

pub const EXIT_ABNORMAL: i32 = 1;
pub const EXIT_UNKNOWN_TASK: i32 = 2;
pub const EXIT_INVALID_PATTERN: i32 = 3;
pub const EXIT_TARGET_NOT_FOUND: i32 = 4;
pub const EXIT_TARGET_CREATION: i32 = 5;
pub const EXIT_SOURCE_NOT_FOUND: i32 = 6;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid regex given \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid date format \"{0}\"")]
    InvalidDateFormat(String),

    #[error("Source directory not found \"{}\"", .0.display())]
    SourceDirectoryNotFound(PathBuf),

    #[error("Target directory does not exist \"{}\"", .0.display())]
    TargetDirectoryNotFound(PathBuf),

    #[error("Target directory could not be created \"{}\": {source}", .path.display())]
    TargetDirectoryCreation {
        path: PathBuf,
        #[source]
        source: ServiceError,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPattern { .. } => EXIT_INVALID_PATTERN,
            Error::TargetDirectoryNotFound(_) => EXIT_TARGET_NOT_FOUND,
            Error::TargetDirectoryCreation { .. } => EXIT_TARGET_CREATION,
            Error::SourceDirectoryNotFound(_) => EXIT_SOURCE_NOT_FOUND,
            Error::Config(_) | Error::InvalidDateFormat(_) | Error::Service(_) => EXIT_ABNORMAL,
        }
    }
}
