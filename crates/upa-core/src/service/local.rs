use chrono::{DateTime, Local};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::{MediaFileService, ServiceError};

/// [`MediaFileService`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalMediaService {
    supported: Vec<String>,
}

impl LocalMediaService {
    pub fn new(supported_formats: Vec<String>) -> Self {
        Self {
            supported: supported_formats,
        }
    }

    fn require_file(&self, path: &Path) -> Result<fs::Metadata, ServiceError> {
        let metadata = fs::metadata(path).map_err(|e| ServiceError::io(path, e))?;
        if !metadata.is_file() {
            return Err(ServiceError::NotAFile(path.to_path_buf()));
        }
        Ok(metadata)
    }
}

impl MediaFileService for LocalMediaService {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        if a == b {
            return true;
        }
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn list_files(
        &self,
        dir: &Path,
        recursive: bool,
        pattern: &Regex,
    ) -> Result<Vec<PathBuf>, ServiceError> {
        let mut walker = WalkDir::new(dir).min_depth(1).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                ServiceError::Io {
                    path,
                    message: e.to_string(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if pattern.is_match(&name) {
                files.push(entry.into_path());
            } else {
                trace!("Pattern rejected \"{}\"", name);
            }
        }
        Ok(files)
    }

    fn supported_extensions(&self) -> &[String] {
        &self.supported
    }

    fn extension_of(&self, path: &Path) -> Result<String, ServiceError> {
        self.require_file(path)?;
        path.extension()
            .map(|e| e.to_string_lossy().into_owned())
            .ok_or_else(|| ServiceError::UnsupportedFormat(path.to_path_buf()))
    }

    fn creation_time(&self, path: &Path) -> Result<DateTime<Local>, ServiceError> {
        let metadata = self.require_file(path)?;
        let time = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map_err(|e| ServiceError::io(path, e))?;
        Ok(DateTime::<Local>::from(time))
    }

    fn copy(&self, source: &Path, target: &Path) -> Result<(), ServiceError> {
        fs::copy(source, target).map_err(|e| ServiceError::io(source, e))?;
        Ok(())
    }

    fn move_file(&self, source: &Path, target: &Path) -> Result<(), ServiceError> {
        match fs::rename(source, target) {
            Ok(()) => Ok(()),
            Err(err) if source.is_file() && target.parent().map_or(true, |p| p.is_dir()) => {
                // rename(2) cannot cross filesystems
                debug!(
                    "Rename failed ({}), copying \"{}\" instead",
                    err,
                    source.display()
                );
                fs::copy(source, target).map_err(|e| ServiceError::io(source, e))?;
                fs::remove_file(source).map_err(|e| ServiceError::io(source, e))
            }
            Err(err) => Err(ServiceError::io(source, err)),
        }
    }

    fn remove(&self, path: &Path) -> Result<(), ServiceError> {
        if !path.exists() {
            return Ok(());
        }
        if !path.is_file() {
            return Err(ServiceError::NotAFile(path.to_path_buf()));
        }
        fs::remove_file(path).map_err(|e| ServiceError::io(path, e))
    }

    fn make_directories(&self, path: &Path) -> Result<(), ServiceError> {
        fs::create_dir_all(path).map_err(|e| ServiceError::io(path, e))
    }
}
